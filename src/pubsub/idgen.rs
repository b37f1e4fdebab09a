//! Генераторы идентификаторов сообщений и транзакций.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use uuid::Uuid;

/// Источник уникальных строковых идентификаторов.
///
/// Брокер вызывает `generate` для `Message::id` и для `tx_id`, когда тот не
/// передан вызывающей стороной.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Монотонный счётчик с префиксом: `msg-1`, `msg-2`, ...
///
/// Удобен в тестах и логах, где важна предсказуемость.
pub struct CounterIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl CounterIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    /// Сколько идентификаторов уже выдано.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for CounterIdGenerator {
    fn default() -> Self {
        Self::new("msg")
    }
}

impl fmt::Debug for CounterIdGenerator {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CounterIdGenerator")
            .field("prefix", &self.prefix)
            .field("issued", &self.issued())
            .finish()
    }
}

impl IdGenerator for CounterIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

/// Случайные UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
