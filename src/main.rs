use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use hero_log::config::{EnvFlags, LoggerConfig};
use hero_log::host::{ExtensionContext, MemoryHost};
use hero_log::logging::{Fields, LoggerFactory, LoggerLayer};

/// Usage: hero-log [EXTENSION_DIR] [CONFIG_TOML]
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let extension_path = match args.next() {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = match args.next() {
        Some(path) => LoggerConfig::load(Path::new(&path))?,
        None => LoggerConfig::default(),
    };

    let host = MemoryHost::new(config.panel_capacity);
    let context = ExtensionContext::new(extension_path);
    let verbosity = config.verbosity;

    let mut factory = LoggerFactory::new(EnvFlags::from_env(), config);
    let logger = factory.create(verbosity, &context, &host);
    let mut acks = logger.subscribe();

    // Route tracing macros through the same sinks
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(LoggerLayer::new(logger.clone()))
        .init();

    logger.profile("activation");
    tracing::info!(path = %context.extension_path().display(), "Extension activated");

    let timer = logger.start_timer();
    logger.info("Indexing %s files", &[json!(5)]);
    timer.done("Indexing finished", Fields::new());
    logger.profile("activation");

    let mut acknowledged = 0usize;
    while acks.try_recv().is_ok() {
        acknowledged += 1;
    }
    tracing::debug!(acknowledged, "Sink writes acknowledged");

    context.dispose_subscriptions();
    Ok(())
}
