pub mod cleanup;
pub mod config;
pub mod paths;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use config::LogConfig;

/// Initialize logging: a compact console stream plus one rotating,
/// non-blocking `engine.log` file. This is the concrete sink behind the
/// `Log(line)` concept an external caller taps via `tracing` subscribers.
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = paths::get_log_directory(config.custom_log_dir.as_deref())?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "engine.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.console_log_level)),
        );

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(&config.file_log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    // Leaking the guard keeps the non-blocking writer alive for the process
    // lifetime; dropping it would silently stop flushing to the file.
    std::mem::forget(file_guard);

    tracing::info!(log_dir = ?log_dir, "logging initialized");

    if config.enable_cleanup {
        tokio::spawn(cleanup::cleanup_task(log_dir.clone(), config.clone()));
        tracing::info!(
            retention_days = config.retention_days,
            max_total_size_mb = config.max_total_size_mb,
            "log cleanup task started"
        );
    }

    Ok(())
}

pub fn log_platform_info() {
    tracing::info!(
        platform = std::env::consts::OS,
        architecture = std::env::consts::ARCH,
        "tts_batch starting"
    );
}
