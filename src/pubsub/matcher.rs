//! Сопоставление имён топиков с паттернами обработчиков.
//!
//! Реестры работают только через [`TopicMatcher`], поэтому стратегию
//! (regex, glob, точное совпадение) можно менять, не трогая логику
//! привязок.

use std::{fmt, str::FromStr, sync::Arc};

use globset::{Glob, GlobMatcher as CompiledGlob};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::error::SettingsError;

/// Предикат «паттерн обработчика подходит к имени топика».
pub trait TopicMatcher: Send + Sync + fmt::Debug {
    fn matches(
        &self,
        topic: &str,
    ) -> bool;

    /// Исходная строка паттерна.
    fn pattern(&self) -> &str;
}

/// Регулярное выражение без неявных якорей: `".*created$"` подходит к
/// `"a.created"`.
///
/// Некомпилируемый паттерн не даёт ошибки, а не совпадает ни с чем.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: String,
    compiled: Option<Regex>,
}

impl RegexMatcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let compiled = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "invalid regex pattern, it will match nothing");
                None
            }
        };
        Self { pattern, compiled }
    }

    /// `false`, если паттерн не скомпилировался.
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }
}

impl TopicMatcher for RegexMatcher {
    fn matches(
        &self,
        topic: &str,
    ) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(topic))
    }

    fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Glob-паттерн (`"orders.*"`, `"a?c"`), как в подписках по шаблону.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    compiled: Option<CompiledGlob>,
}

impl GlobMatcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let compiled = match Glob::new(&pattern) {
            Ok(glob) => Some(glob.compile_matcher()),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "invalid glob pattern, it will match nothing");
                None
            }
        };
        Self { pattern, compiled }
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }
}

impl TopicMatcher for GlobMatcher {
    fn matches(
        &self,
        topic: &str,
    ) -> bool {
        self.compiled.as_ref().is_some_and(|g| g.is_match(topic))
    }

    fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Точное совпадение имени.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatcher {
    name: String,
}

impl ExactMatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TopicMatcher for ExactMatcher {
    fn matches(
        &self,
        topic: &str,
    ) -> bool {
        self.name == topic
    }

    fn pattern(&self) -> &str {
        &self.name
    }
}

/// Как брокер компилирует строковые паттерны обработчиков.
///
/// Десериализуется через [`FromStr`], регистр имени не важен.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum MatchStrategy {
    #[default]
    Regex,
    Glob,
    Exact,
}

impl MatchStrategy {
    pub fn compile(
        self,
        pattern: &str,
    ) -> Arc<dyn TopicMatcher> {
        match self {
            Self::Regex => Arc::new(RegexMatcher::new(pattern)),
            Self::Glob => Arc::new(GlobMatcher::new(pattern)),
            Self::Exact => Arc::new(ExactMatcher::new(pattern)),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regex" => Ok(Self::Regex),
            "glob" => Ok(Self::Glob),
            "exact" => Ok(Self::Exact),
            _ => Err(SettingsError::UnknownMatchStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for MatchStrategy {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(".*created$", "a.created", true)]
    #[case(".*created$", "a.deleted", false)]
    #[case(".*created$", "a.created.v2", false)]
    #[case("created", "a.created.v2", true)]
    #[case("^orders\\.", "orders.paid", true)]
    #[case("^orders\\.", "old.orders.paid", false)]
    fn test_regex_matching(
        #[case] pattern: &str,
        #[case] topic: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(RegexMatcher::new(pattern).matches(topic), expected);
    }

    #[rstest]
    #[case("orders.*", "orders.paid", true)]
    #[case("orders.*", "users.created", false)]
    #[case("a?c", "abc", true)]
    #[case("a?c", "abbc", false)]
    fn test_glob_matching(
        #[case] pattern: &str,
        #[case] topic: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(GlobMatcher::new(pattern).matches(topic), expected);
    }

    /// Тест проверяет, что некорректные паттерны ничего не совпадают и не
    /// паникуют.
    #[test]
    fn test_malformed_patterns_match_nothing() {
        let re = RegexMatcher::new("(unclosed");
        assert!(!re.is_valid());
        assert!(!re.matches("(unclosed"));
        assert!(!re.matches(""));
        assert_eq!(re.pattern(), "(unclosed");

        let glob = GlobMatcher::new("[");
        assert!(!glob.is_valid());
        assert!(!glob.matches("["));
    }

    #[test]
    fn test_exact_matcher() {
        let m = ExactMatcher::new("a.created");
        assert!(m.matches("a.created"));
        assert!(!m.matches("a.created2"));
        assert!(!m.matches("xa.created"));
    }

    #[test]
    fn test_strategy_compile_and_parse() {
        assert_eq!(MatchStrategy::default(), MatchStrategy::Regex);
        assert_eq!("GLOB".parse::<MatchStrategy>().unwrap(), MatchStrategy::Glob);
        assert_eq!(" exact ".parse::<MatchStrategy>().unwrap(), MatchStrategy::Exact);
        assert!(matches!(
            "fuzzy".parse::<MatchStrategy>(),
            Err(SettingsError::UnknownMatchStrategy(s)) if s == "fuzzy"
        ));

        let m = MatchStrategy::Glob.compile("a.*");
        assert!(m.matches("a.b"));
        assert_eq!(m.pattern(), "a.*");
        // Для regex "a.*" тоже подходит, а для exact только буквально.
        assert!(MatchStrategy::Regex.compile("a.*").matches("xa"));
        assert!(!MatchStrategy::Exact.compile("a.*").matches("a.b"));
    }
}
