use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global subscriber. Filter comes from `PINYIN_LOG`; output goes
/// to stderr so it never mixes with the practice prompts.
pub fn init_tracing() {
    let filter = std::env::var("PINYIN_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let env_filter =
        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
