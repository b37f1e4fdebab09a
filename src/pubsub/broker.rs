use std::{
    any::Any,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::Utc;
use hubbub_error::{ensure, HubbubResult, ResultExt, StatusCode};
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::{
    registry::Registry, Correlation, CounterIdGenerator, Handler, IdGenerator, MatchStrategy,
    Message, MessageOptions, Payload, UuidIdGenerator,
};
use crate::{
    config::{IdGeneratorKind, Settings},
    error::{BrokerError, BrokerResult},
};

/// Снимок счётчиков брокера.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    /// Успешные вызовы `emit*` (топик найден).
    pub emitted: u64,
    /// Вызовы обработчиков, завершившиеся без паники.
    pub delivered: u64,
    /// Вызовы `emit*` для незарегистрированного топика.
    pub topic_misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    emitted: AtomicU64,
    delivered: AtomicU64,
    topic_misses: AtomicU64,
}

/// Внутрипроцессный брокер сообщений.
///
/// Поддерживает:
/// - Регистрацию топиков и обработчиков в любом порядке
/// - Привязку обработчиков к топикам по паттерну, включая топики,
///   появившиеся позже обработчика
/// - Синхронную доставку одного сообщения всем привязанным обработчикам
/// - Сквозной `tx_id` для вложенных публикаций
///
/// Все реестры лежат под одним `RwLock`. Публикация берёт read-lock только
/// на время снятия снимка привязок и отпускает его до вызова обработчиков,
/// так что обработчик может снова обращаться к брокеру. Изменения,
/// сделанные во время доставки, на текущую доставку не влияют.
pub struct Broker {
    ids: Arc<dyn IdGenerator>,
    strategy: MatchStrategy,
    registry: RwLock<Registry>,
    counters: Counters,
}

impl Broker {
    /// Создаёт брокер со стратегией паттернов по умолчанию (regex).
    ///
    /// Без генератора идентификаторов брокер не создаётся:
    /// [`BrokerError::MissingIdGenerator`].
    pub fn new(ids: Option<Arc<dyn IdGenerator>>) -> BrokerResult<Self> {
        Self::with_strategy(ids, MatchStrategy::default())
    }

    pub fn with_strategy(
        ids: Option<Arc<dyn IdGenerator>>,
        strategy: MatchStrategy,
    ) -> BrokerResult<Self> {
        let ids = ids.ok_or(BrokerError::MissingIdGenerator)?;
        debug!(?strategy, "broker created");
        Ok(Self {
            ids,
            strategy,
            registry: RwLock::new(Registry::default()),
            counters: Counters::default(),
        })
    }

    /// Собирает брокер по настройкам и регистрирует перечисленные в них
    /// топики.
    pub fn from_settings(settings: &Settings) -> HubbubResult<Self> {
        let ids: Arc<dyn IdGenerator> = match settings.id_generator {
            IdGeneratorKind::Uuid => Arc::new(UuidIdGenerator),
            IdGeneratorKind::Counter => Arc::new(CounterIdGenerator::new(&settings.id_prefix)),
        };
        let broker = Self::with_strategy(Some(ids), settings.match_strategy)
            .context("building broker from settings")?;

        for topic in &settings.topics {
            ensure!(
                !topic.trim().is_empty(),
                StatusCode::InvalidArgs,
                "empty topic name in settings"
            );
            broker.register_topic(topic.trim());
        }
        Ok(broker)
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    ////////////////////////////////////////////////////////////////////////////
    // Топики
    ////////////////////////////////////////////////////////////////////////////

    /// Регистрирует топик и сразу привязывает к нему подходящие
    /// обработчики. Повторный вызов ничего не меняет; `false`, если топик
    /// уже был.
    pub fn register_topic(
        &self,
        name: &str,
    ) -> bool {
        self.registry.write().register_topic(name)
    }

    /// Удаляет топик вместе со списком привязок. Обработчики не
    /// уведомляются.
    pub fn deregister_topic(
        &self,
        name: &str,
    ) -> bool {
        self.registry.write().deregister_topic(name)
    }

    pub fn has_topic(
        &self,
        name: &str,
    ) -> bool {
        self.registry.read().has_topic(name)
    }

    pub fn list_topics(&self) -> Vec<String> {
        self.registry.read().list_topics()
    }

    pub fn topic_count(&self) -> usize {
        self.registry.read().topic_count()
    }

    ////////////////////////////////////////////////////////////////////////////
    // Обработчики
    ////////////////////////////////////////////////////////////////////////////

    /// Регистрирует обработчик под ключом `key` (upsert).
    ///
    /// Если ключ уже занят, старый обработчик сначала снимается со всех
    /// топиков, даже если новый паттерн совсем другой.
    pub fn register_handler(
        &self,
        key: &str,
        handler: Handler,
    ) {
        self.registry.write().register_handler(key, handler)
    }

    /// То же, что `register_handler`, но паттерн компилируется стратегией
    /// брокера.
    pub fn register_handler_fn<F>(
        &self,
        key: &str,
        pattern: &str,
        handle: F,
    ) where
        F: Fn(&Correlation, &Message) + Send + Sync + 'static,
    {
        let handler = Handler::from_parts(self.strategy.compile(pattern), Arc::new(handle));
        self.register_handler(key, handler)
    }

    /// Снимает обработчик со всех топиков. `false`, если ключ неизвестен.
    pub fn deregister_handler(
        &self,
        key: &str,
    ) -> bool {
        self.registry.write().deregister_handler(key)
    }

    pub fn has_handler(
        &self,
        key: &str,
    ) -> bool {
        self.registry.read().has_handler(key)
    }

    pub fn list_handler_keys(&self) -> Vec<String> {
        self.registry.read().list_handler_keys()
    }

    pub fn handler_count(&self) -> usize {
        self.registry.read().handler_count()
    }

    /// Топики, к которым сейчас подходит паттерн обработчика.
    pub fn subscriptions_of(
        &self,
        key: &str,
    ) -> Vec<String> {
        self.registry.read().subscriptions_of(key)
    }

    /// Ключи обработчиков, привязанных к топику, в порядке доставки.
    pub fn attached_handler_keys(
        &self,
        topic: &str,
    ) -> Vec<String> {
        self.registry.read().attached_handler_keys(topic)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Публикация
    ////////////////////////////////////////////////////////////////////////////

    /// Публикует `data` в топик и синхронно вызывает все привязанные
    /// обработчики.
    ///
    /// `source` и `tx_id` берутся из `ctx`. Если `tx_id` нет, он
    /// генерируется, и обработчики получают контекст уже с ним: вложенный
    /// `emit` из обработчика продолжит ту же транзакцию.
    ///
    /// Паника в обработчике не перехватывается и прерывает доставку
    /// оставшимся обработчикам.
    pub fn emit<T: Any + Send + Sync>(
        &self,
        ctx: &Correlation,
        topic: &str,
        data: T,
    ) -> BrokerResult<()> {
        self.emit_payload(ctx, topic, Payload::new(data))
    }

    /// Как `emit`, но с готовым [`Payload`] (например, чтобы переслать
    /// данные полученного сообщения без повторной упаковки).
    pub fn emit_payload(
        &self,
        ctx: &Correlation,
        topic: &str,
        data: Payload,
    ) -> BrokerResult<()> {
        let handlers = self.lookup(topic)?;

        let (ctx, tx_id) = match ctx.tx_id() {
            Some(tx_id) => (ctx.clone(), tx_id.to_string()),
            None => {
                let tx_id = self.ids.generate();
                (ctx.clone().with_tx_id(tx_id.clone()), tx_id)
            }
        };

        let msg = Message {
            id: self.ids.generate(),
            tx_id,
            topic: topic.to_string(),
            source: ctx.source().map(str::to_string),
            occurred_at: Utc::now(),
            data,
        };

        self.deliver(&ctx, &msg, &handlers);
        Ok(())
    }

    /// Публикация с явными полями сообщения.
    ///
    /// `tx_id` из `ctx` здесь не используется: для сквозной корреляции его
    /// нужно передать через [`MessageOptions::with_tx_id`]. Сам `ctx`
    /// передаётся обработчикам без изменений.
    pub fn emit_with_options<T: Any + Send + Sync>(
        &self,
        ctx: &Correlation,
        topic: &str,
        data: T,
        options: MessageOptions,
    ) -> BrokerResult<()> {
        let handlers = self.lookup(topic)?;
        let msg = options.build(topic, Payload::new(data), || self.ids.generate(), Utc::now);
        self.deliver(ctx, &msg, &handlers);
        Ok(())
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            emitted: self.counters.emitted.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            topic_misses: self.counters.topic_misses.load(Ordering::Relaxed),
        }
    }

    /// Снимок привязок топика; lock отпускается при выходе.
    fn lookup(
        &self,
        topic: &str,
    ) -> BrokerResult<Vec<Handler>> {
        let snapshot = self.registry.read().snapshot(topic);
        match snapshot {
            Some(handlers) => {
                self.counters.emitted.fetch_add(1, Ordering::Relaxed);
                Ok(handlers)
            }
            None => {
                self.counters.topic_misses.fetch_add(1, Ordering::Relaxed);
                debug!(topic, "emit to unregistered topic");
                Err(BrokerError::topic_not_found(topic))
            }
        }
    }

    fn deliver(
        &self,
        ctx: &Correlation,
        msg: &Message,
        handlers: &[Handler],
    ) {
        trace!(
            topic = %msg.topic,
            id = %msg.id,
            tx_id = %msg.tx_id,
            handlers = handlers.len(),
            "emit"
        );
        for handler in handlers {
            handler.call(ctx, msg);
            self.counters.delivered.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("Broker")
            .field("strategy", &self.strategy)
            .field("topics", &registry.topic_count())
            .field("handlers", &registry.handler_count())
            .field("stats", &self.stats())
            .finish()
    }
}
