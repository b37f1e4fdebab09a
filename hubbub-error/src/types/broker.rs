use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки брокера.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Брокер создаётся без генератора идентификаторов.
    #[error("config error: an id generator is required to build a broker")]
    MissingIdGenerator,

    /// Публикация в топик, который не был зарегистрирован.
    #[error("topic not found: {topic}")]
    TopicNotFound { topic: String },
}

impl BrokerError {
    pub fn topic_not_found(topic: impl Into<String>) -> Self {
        Self::TopicNotFound {
            topic: topic.into(),
        }
    }
}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingIdGenerator => StatusCode::InvalidConfig,
            Self::TopicNotFound { .. } => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "broker".to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        if let Self::TopicNotFound { topic } = self {
            tags.push(("topic", topic.clone()));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_not_found_display_contains_topic() {
        let err = BrokerError::topic_not_found("a.created");
        assert_eq!(err.to_string(), "topic not found: a.created");
        assert_eq!(err.status_code(), StatusCode::NotFound);
    }

    #[test]
    fn test_missing_generator_is_config_error() {
        let err = BrokerError::MissingIdGenerator;
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert!(err.to_string().starts_with("config error"));
        // InvalidConfig не скрывается за "Internal error".
        assert_eq!(err.client_message(), err.to_string());
    }

    #[test]
    fn test_metrics_tags_carry_topic() {
        let tags = BrokerError::topic_not_found("orders").metrics_tags();
        assert!(tags.contains(&("topic", "orders".to_string())));
        assert!(BrokerError::MissingIdGenerator
            .metrics_tags()
            .iter()
            .all(|(k, _)| *k != "topic"));
    }
}
