pub fn setup_logging() {
    let mut builder = env_logger::Builder::new();

    // The session prints its views to stdout; keep dependency chatter down.
    builder.filter(None, log::LevelFilter::Warn);
    builder.filter(Some("filmgrid"), log::LevelFilter::Info);

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    }

    builder.format_timestamp(None).init();
}
