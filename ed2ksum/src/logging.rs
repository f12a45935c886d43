/// Install the logger.
///
/// Level defaults to WARN. Can be set with the RUST_LOG env variable.
pub fn init() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    builder.format_timestamp(None);
    builder.parse_default_env();
    builder.init();
}
