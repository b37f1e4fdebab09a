use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Корреляционный контекст, который явно передаётся через цепочку `emit`.
///
/// Содержит идентификатор транзакции (`tx_id`) и метку источника. Брокер
/// передаёт обработчикам контекст с уже заполненным `tx_id`, поэтому
/// вложенный `emit` из обработчика продолжает ту же транзакцию.
///
/// Флаг отмены общий для всех клонов. Брокер его не проверяет: решать,
/// учитывать ли отмену, может только сам обработчик.
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    tx_id: Option<String>,
    source: Option<String>,
    cancelled: Arc<AtomicBool>,
}

impl Correlation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tx_id(
        mut self,
        tx_id: impl Into<String>,
    ) -> Self {
        self.tx_id = Some(tx_id.into());
        self
    }

    pub fn with_source(
        mut self,
        source: impl Into<String>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Помечает контекст (и все его клоны) отменённым.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_by_default() {
        let ctx = Correlation::new();
        assert_eq!(ctx.tx_id(), None);
        assert_eq!(ctx.source(), None);
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_builder_sets_slots() {
        let ctx = Correlation::new().with_tx_id("tx-1").with_source("billing");
        assert_eq!(ctx.tx_id(), Some("tx-1"));
        assert_eq!(ctx.source(), Some("billing"));
    }

    /// Тест проверяет, что отмена видна через все клоны, в том числе
    /// полученные после добавления `tx_id`.
    #[test]
    fn test_cancellation_shared_between_clones() {
        let root = Correlation::new();
        let derived = root.clone().with_tx_id("tx-9");
        root.cancel();
        assert!(derived.is_cancelled());
        assert_eq!(root.tx_id(), None);
    }
}
