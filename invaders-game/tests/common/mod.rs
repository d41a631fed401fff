use lazy_static::lazy_static;
use ql::learn::tabular_q_learner::Parameter;

pub const TRAINING_EPISODES: usize = 3;

#[rustfmt::skip]
lazy_static! {
    pub static ref SEEDED_PARAMETER: Parameter = Parameter { seed: Some(17), ..Parameter::default() };
}

#[ctor::ctor]
fn init_logging() {
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .init()
}
