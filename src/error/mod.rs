pub use hubbub_error::BrokerError;

use thiserror::Error;

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Ошибки загрузки настроек.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("unknown match strategy: {0}")]
    UnknownMatchStrategy(String),

    #[error("unknown id generator: {0}")]
    UnknownIdGenerator(String),
}

impl hubbub_error::ErrorExt for SettingsError {
    fn status_code(&self) -> hubbub_error::StatusCode {
        hubbub_error::StatusCode::InvalidConfig
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
