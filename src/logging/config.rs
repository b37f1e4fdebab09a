use std::str::FromStr;

use serde::Deserialize;

/// Формат вывода логов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень (`trace`, `debug`, `info`, ...).
    pub level: String,
    /// Отдельный уровень для целей `hubbub::*`, если задан.
    pub broker_level: Option<String>,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_ansi: bool,
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            broker_level: None,
            format: LogFormat::default(),
            with_target: true,
            with_ansi: true,
            with_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Директива для `EnvFilter`, например `"info,hubbub=debug"`.
    pub fn build_filter_directive(&self) -> String {
        match &self.broker_level {
            Some(lvl) => format!("{},hubbub={lvl}", self.level),
            None => self.level.clone(),
        }
    }

    /// `HUBBUB_LOG_FORMAT` перекрывает формат из конфигурации.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("HUBBUB_LOG_FORMAT") {
            match raw.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("{e}; keeping {:?}", self.format),
            }
        }
    }
}
