use num_format::{CustomFormat, Grouping};

/// Number format for log output, e.g. `1_000_000`
pub fn number_format() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .minus_sign("-")
        .separator("_")
        .build()
        .expect("number format should be valid")
}
