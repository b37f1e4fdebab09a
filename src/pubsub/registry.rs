//! Реестры топиков и обработчиков.
//!
//! Инвариант: список привязок топика всегда совпадает с множеством
//! зарегистрированных обработчиков, чей паттерн подходит к имени топика.
//! Он поддерживается явным пересчётом при каждой мутации, а не фоновой
//! проверкой.
//!
//! Каждой регистрации обработчика выдаётся возрастающий `seq`, и списки
//! привязок отсортированы по нему. Удаление сохраняет порядок, так что
//! порядок доставки совпадает с порядком регистрации обработчиков.

use std::collections::HashMap;

use tracing::debug;

use super::Handler;

/// Копия обработчика внутри списка привязок топика.
#[derive(Debug, Clone)]
pub(crate) struct Attachment {
    key: String,
    seq: u64,
    handler: Handler,
}

#[derive(Debug)]
struct HandlerEntry {
    seq: u64,
    handler: Handler,
}

/// Имена топиков и их текущие привязки.
#[derive(Debug, Default)]
pub(crate) struct TopicRegistry {
    topics: HashMap<String, Vec<Attachment>>,
}

impl TopicRegistry {
    fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.topics.contains_key(name)
    }

    fn names(&self) -> impl Iterator<Item = &String> {
        self.topics.keys()
    }

    fn attachments(
        &self,
        name: &str,
    ) -> Option<&[Attachment]> {
        self.topics.get(name).map(Vec::as_slice)
    }

    fn insert(
        &mut self,
        name: &str,
        attachments: Vec<Attachment>,
    ) {
        self.topics.insert(name.to_string(), attachments);
    }

    fn remove(
        &mut self,
        name: &str,
    ) -> bool {
        self.topics.remove(name).is_some()
    }

    /// Добавляет копию обработчика ко всем подходящим топикам.
    /// Возвращает число новых привязок.
    fn attach_everywhere(
        &mut self,
        key: &str,
        seq: u64,
        handler: &Handler,
    ) -> usize {
        let mut attached = 0;
        for (name, list) in self.topics.iter_mut() {
            if handler.matches(name) {
                // seq новой регистрации максимальный, сортировка сохраняется
                list.push(Attachment {
                    key: key.to_string(),
                    seq,
                    handler: handler.clone(),
                });
                attached += 1;
            }
        }
        attached
    }

    /// Убирает обработчик `key` из всех списков, сохраняя порядок остальных.
    fn detach_everywhere(
        &mut self,
        key: &str,
    ) -> usize {
        let mut detached = 0;
        for list in self.topics.values_mut() {
            if let Some(pos) = list.iter().position(|a| a.key == key) {
                list.remove(pos);
                detached += 1;
            }
        }
        detached
    }

    fn len(&self) -> usize {
        self.topics.len()
    }
}

/// Обработчики по уникальному ключу.
#[derive(Debug, Default)]
pub(crate) struct HandlerRegistry {
    handlers: HashMap<String, HandlerEntry>,
    next_seq: u64,
}

impl HandlerRegistry {
    fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.handlers.contains_key(key)
    }

    fn get(
        &self,
        key: &str,
    ) -> Option<&Handler> {
        self.handlers.get(key).map(|e| &e.handler)
    }

    fn insert(
        &mut self,
        key: &str,
        handler: Handler,
    ) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.handlers.insert(key.to_string(), HandlerEntry { seq, handler });
        seq
    }

    fn remove(
        &mut self,
        key: &str,
    ) -> bool {
        self.handlers.remove(key).is_some()
    }

    /// Привязки для нового топика, в порядке регистрации.
    fn matching(
        &self,
        topic: &str,
    ) -> Vec<Attachment> {
        let mut found: Vec<Attachment> = self
            .handlers
            .iter()
            .filter(|(_, e)| e.handler.matches(topic))
            .map(|(key, e)| Attachment {
                key: key.clone(),
                seq: e.seq,
                handler: e.handler.clone(),
            })
            .collect();
        found.sort_by_key(|a| a.seq);
        found
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.handlers.keys()
    }

    fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// Оба реестра вместе: все операции, которым нужно держать их
/// согласованными.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    topics: TopicRegistry,
    handlers: HandlerRegistry,
}

impl Registry {
    /// Идемпотентна: повторная регистрация не трогает существующие
    /// привязки. Возвращает `true`, если топик добавлен.
    pub(crate) fn register_topic(
        &mut self,
        name: &str,
    ) -> bool {
        if self.topics.contains(name) {
            return false;
        }
        let attachments = self.handlers.matching(name);
        debug!(topic = name, handlers = attachments.len(), "topic registered");
        self.topics.insert(name, attachments);
        true
    }

    pub(crate) fn deregister_topic(
        &mut self,
        name: &str,
    ) -> bool {
        let removed = self.topics.remove(name);
        if removed {
            debug!(topic = name, "topic deregistered");
        }
        removed
    }

    /// Upsert: старая запись под тем же ключом полностью снимается до
    /// вставки новой.
    pub(crate) fn register_handler(
        &mut self,
        key: &str,
        handler: Handler,
    ) {
        let replaced = self.deregister_handler(key);
        let seq = self.handlers.insert(key, handler.clone());
        let attached = self.topics.attach_everywhere(key, seq, &handler);
        debug!(
            key,
            pattern = handler.pattern(),
            attached,
            replaced,
            "handler registered"
        );
    }

    pub(crate) fn deregister_handler(
        &mut self,
        key: &str,
    ) -> bool {
        if !self.handlers.contains(key) {
            return false;
        }
        let detached = self.topics.detach_everywhere(key);
        self.handlers.remove(key);
        debug!(key, detached, "handler deregistered");
        true
    }

    /// Снимок обработчиков топика в порядке доставки.
    pub(crate) fn snapshot(
        &self,
        topic: &str,
    ) -> Option<Vec<Handler>> {
        self.topics
            .attachments(topic)
            .map(|list| list.iter().map(|a| a.handler.clone()).collect())
    }

    pub(crate) fn has_topic(
        &self,
        name: &str,
    ) -> bool {
        self.topics.contains(name)
    }

    pub(crate) fn has_handler(
        &self,
        key: &str,
    ) -> bool {
        self.handlers.contains(key)
    }

    pub(crate) fn list_topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.names().cloned().collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn list_handler_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.handlers.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Топики, к которым сейчас подходит паттерн обработчика. Считается
    /// заново при каждом вызове.
    pub(crate) fn subscriptions_of(
        &self,
        key: &str,
    ) -> Vec<String> {
        let Some(handler) = self.handlers.get(key) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .topics
            .names()
            .filter(|name| handler.matches(name))
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    /// Ключи обработчиков топика в порядке доставки.
    pub(crate) fn attached_handler_keys(
        &self,
        topic: &str,
    ) -> Vec<String> {
        self.topics
            .attachments(topic)
            .map(|list| list.iter().map(|a| a.key.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
