pub mod broker;

pub use broker::*;

use crate::{ErrorExt, StatusCode};

/// Универсальная ошибка с кодом и сообщением.
///
/// Используется макросами `bail!`/`ensure!`, когда отдельный тип ошибки
/// не нужен.
#[derive(Debug, Clone)]
pub struct GenericError {
    code: StatusCode,
    message: String,
}

impl GenericError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenericError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GenericError {}

impl ErrorExt for GenericError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StackError;

    #[test]
    fn test_generic_error() {
        let err = GenericError::new(StatusCode::InvalidArgs, "empty topic name");
        assert_eq!(err.status_code(), StatusCode::InvalidArgs);
        assert_eq!(err.to_string(), "empty topic name");
    }

    /// Тест проверяет downcast через `StackError`.
    #[test]
    fn test_generic_error_downcast_through_stack() {
        let stack = StackError::new(GenericError::new(StatusCode::Unsupported, "nope"));
        let down = stack.downcast_ref::<GenericError>().unwrap();
        assert_eq!(down.status_code(), StatusCode::Unsupported);
        assert!(stack.downcast_ref::<crate::BrokerError>().is_none());
    }
}
