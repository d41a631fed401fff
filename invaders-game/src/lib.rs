pub mod environment;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .init()
}
