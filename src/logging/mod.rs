//! Инициализация `tracing` для приложений, использующих брокер.

pub mod config;
mod filters;
mod formatter;

pub use config::{LogFormat, LoggingConfig};
pub use filters::build_filter_from_config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Устанавливает глобальный subscriber: фильтр из конфигурации (или
/// `RUST_LOG`) и консольный слой.
///
/// Повторный вызов возвращает ошибку, а не паникует.
pub fn init_logging(
    mut config: LoggingConfig
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    config.apply_env_overrides();

    tracing_subscriber::registry()
        .with(filters::build_filter_from_config(&config))
        .with(formatter::build_formatter_from_config(&config))
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        filter = %config.build_filter_directive(),
        format = ?config.format,
        "Logging system initialized"
    );
    Ok(())
}
