use std::str::FromStr;

use config::{Config, Environment};
use serde::Deserialize;

use crate::{error::SettingsError, pubsub::MatchStrategy};

/// Какой генератор идентификаторов использует брокер.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum IdGeneratorKind {
    #[default]
    Uuid,
    Counter,
}

impl FromStr for IdGeneratorKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "counter" => Ok(Self::Counter),
            _ => Err(SettingsError::UnknownIdGenerator(s.to_string())),
        }
    }
}

impl TryFrom<String> for IdGeneratorKind {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Настройки брокера.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub id_generator: IdGeneratorKind,
    /// Префикс для `IdGeneratorKind::Counter`.
    pub id_prefix: String,
    pub match_strategy: MatchStrategy,
    /// Топики, регистрируемые сразу при создании брокера.
    pub topics: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_generator: IdGeneratorKind::Uuid,
            id_prefix: "msg".to_string(),
            match_strategy: MatchStrategy::Regex,
            topics: Vec::new(),
        }
    }
}

impl Settings {
    /// Значения по умолчанию плюс переменные окружения `HUBBUB_*`
    /// (`HUBBUB_TOPICS=a.created,a.deleted`).
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_with_prefix("HUBBUB")
    }

    /// Имена генератора и стратегии разбираются через `FromStr`:
    /// неизвестное имя даёт `UnknownIdGenerator` / `UnknownMatchStrategy`.
    pub fn load_with_prefix(prefix: &str) -> Result<Self, SettingsError> {
        let cfg = Config::builder()
            .set_default("id_generator", "uuid")?
            .set_default("id_prefix", "msg")?
            .set_default("match_strategy", "regex")?
            .set_default("topics", Vec::<String>::new())?
            .add_source(
                Environment::with_prefix(prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("topics"),
            )
            .build()?;

        Ok(Self {
            id_generator: cfg.get_string("id_generator")?.parse()?,
            id_prefix: cfg.get_string("id_prefix")?,
            match_strategy: cfg.get_string("match_strategy")?.parse()?,
            topics: cfg.get::<Vec<String>>("topics")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    fn clear(prefix: &str) {
        for key in ["ID_GENERATOR", "ID_PREFIX", "MATCH_STRATEGY", "TOPICS"] {
            env::remove_var(format!("{prefix}_{key}"));
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear("HUBBUB_T1");
        let s = Settings::load_with_prefix("HUBBUB_T1").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear("HUBBUB_T2");
        env::set_var("HUBBUB_T2_ID_GENERATOR", "counter");
        env::set_var("HUBBUB_T2_ID_PREFIX", "evt");
        env::set_var("HUBBUB_T2_MATCH_STRATEGY", "glob");
        env::set_var("HUBBUB_T2_TOPICS", "a.created,a.deleted");

        let s = Settings::load_with_prefix("HUBBUB_T2").unwrap();
        clear("HUBBUB_T2");

        assert_eq!(s.id_generator, IdGeneratorKind::Counter);
        assert_eq!(s.id_prefix, "evt");
        assert_eq!(s.match_strategy, MatchStrategy::Glob);
        assert_eq!(s.topics, vec!["a.created", "a.deleted"]);
    }

    #[test]
    #[serial]
    fn test_unknown_strategy_is_rejected() {
        clear("HUBBUB_T3");
        env::set_var("HUBBUB_T3_MATCH_STRATEGY", "fuzzy");
        let res = Settings::load_with_prefix("HUBBUB_T3");
        clear("HUBBUB_T3");
        assert!(matches!(res, Err(SettingsError::UnknownMatchStrategy(ref s)) if s == "fuzzy"));
    }

    #[test]
    #[serial]
    fn test_unknown_id_generator_is_rejected() {
        clear("HUBBUB_T4");
        env::set_var("HUBBUB_T4_ID_GENERATOR", "snowflake");
        let res = Settings::load_with_prefix("HUBBUB_T4");
        clear("HUBBUB_T4");
        assert!(matches!(res, Err(SettingsError::UnknownIdGenerator(ref s)) if s == "snowflake"));
    }

    /// Тест проверяет, что имена из окружения разбираются так же, как
    /// через `FromStr`: без учёта регистра.
    #[test]
    #[serial]
    fn test_env_names_are_case_insensitive() {
        clear("HUBBUB_T5");
        env::set_var("HUBBUB_T5_ID_GENERATOR", "Counter");
        env::set_var("HUBBUB_T5_MATCH_STRATEGY", "GLOB");
        let res = Settings::load_with_prefix("HUBBUB_T5");
        clear("HUBBUB_T5");

        let s = res.unwrap();
        assert_eq!(s.id_generator, IdGeneratorKind::Counter);
        assert_eq!(s.match_strategy, "GLOB".parse::<MatchStrategy>().unwrap());
        assert_eq!(s.match_strategy, MatchStrategy::Glob);
    }

    /// Тест проверяет, что serde-десериализация `Settings` идёт через тот
    /// же `FromStr`.
    #[test]
    fn test_deserialize_uses_from_str() {
        let cfg = Config::builder()
            .set_override("id_generator", "UUID")
            .unwrap()
            .set_override("id_prefix", "msg")
            .unwrap()
            .set_override("match_strategy", "Exact")
            .unwrap()
            .set_override("topics", vec!["a"])
            .unwrap()
            .build()
            .unwrap();
        let s: Settings = cfg.try_deserialize().unwrap();
        assert_eq!(s.id_generator, IdGeneratorKind::Uuid);
        assert_eq!(s.match_strategy, MatchStrategy::Exact);
        assert_eq!(s.topics, vec!["a"]);
    }

    #[test]
    fn test_id_generator_kind_from_str() {
        assert_eq!("Counter".parse::<IdGeneratorKind>().unwrap(), IdGeneratorKind::Counter);
        assert!(matches!(
            "snowflake".parse::<IdGeneratorKind>(),
            Err(SettingsError::UnknownIdGenerator(_))
        ));
    }
}
