use std::{any::Any, fmt, sync::Arc};

use chrono::{DateTime, Utc};

/// Непрозрачные данные сообщения.
///
/// Хранит значение любого типа за `Arc`, поэтому копии сообщения делят одни
/// и те же данные. Обработчик достаёт значение через [`Payload::downcast_ref`].
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Имя типа, с которым был создан payload.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Payload<{}>", self.type_name)
    }
}

/// Сообщение, доставляемое обработчикам.
///
/// Создаётся брокером один раз на каждый `emit`; обработчики получают его
/// по ссылке и изменить не могут.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub tx_id: String,
    pub topic: String,
    pub source: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub data: Payload,
}

impl Message {
    /// Данные сообщения, приведённые к `T`.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

/// Необязательные поля сообщения для `Broker::emit_with_options`.
///
/// Каждый `with_*` возвращает изменённую копию, исходное значение не
/// трогается. Повторный вызов для того же поля заменяет прежнее значение.
/// Поля, оставшиеся `None`, брокер заполняет сам: `id` и `tx_id` новым
/// идентификатором, `occurred_at` текущим временем. Явно заданное значение,
/// даже пустая строка, не перезаписывается.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    pub id: Option<String>,
    pub tx_id: Option<String>,
    pub source: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(
        mut self,
        id: impl Into<String>,
    ) -> Self {
        self.id = Some(id.into());
        self
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

    pub fn with_occurred_at(
        mut self,
        at: DateTime<Utc>,
    ) -> Self {
        self.occurred_at = Some(at);
        self
    }

    /// Собирает сообщение, дополняя незаданные поля через `fill_id` и `now`.
    pub(crate) fn build(
        self,
        topic: &str,
        data: Payload,
        mut fill_id: impl FnMut() -> String,
        now: impl FnOnce() -> DateTime<Utc>,
    ) -> Message {
        Message {
            tx_id: self.tx_id.unwrap_or_else(&mut fill_id),
            id: self.id.unwrap_or_else(&mut fill_id),
            topic: topic.to_string(),
            source: self.source,
            occurred_at: self.occurred_at.unwrap_or_else(now),
            data,
        }
    }
}
