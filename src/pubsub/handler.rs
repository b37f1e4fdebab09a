use std::{fmt, sync::Arc};

use super::{
    matcher::{ExactMatcher, GlobMatcher, RegexMatcher, TopicMatcher},
    Correlation, Message,
};

/// Тело обработчика: синхронный вызов без результата.
pub type HandleFn = Arc<dyn Fn(&Correlation, &Message) + Send + Sync>;

/// Описание обработчика: паттерн и функция.
///
/// Клонирование дешёвое (два `Arc`), поэтому в списках привязок топиков
/// лежат копии, разделяющие одну функцию и один matcher.
#[derive(Clone)]
pub struct Handler {
    matcher: Arc<dyn TopicMatcher>,
    handle: HandleFn,
}

impl Handler {
    pub fn new<M, F>(
        matcher: M,
        handle: F,
    ) -> Self
    where
        M: TopicMatcher + 'static,
        F: Fn(&Correlation, &Message) + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(matcher), Arc::new(handle))
    }

    pub fn from_parts(
        matcher: Arc<dyn TopicMatcher>,
        handle: HandleFn,
    ) -> Self {
        Self { matcher, handle }
    }

    /// Обработчик с regex-паттерном.
    pub fn regex<F>(
        pattern: &str,
        handle: F,
    ) -> Self
    where
        F: Fn(&Correlation, &Message) + Send + Sync + 'static,
    {
        Self::new(RegexMatcher::new(pattern), handle)
    }

    /// Обработчик с glob-паттерном.
    pub fn glob<F>(
        pattern: &str,
        handle: F,
    ) -> Self
    where
        F: Fn(&Correlation, &Message) + Send + Sync + 'static,
    {
        Self::new(GlobMatcher::new(pattern), handle)
    }

    /// Обработчик ровно одного топика.
    pub fn exact<F>(
        topic: &str,
        handle: F,
    ) -> Self
    where
        F: Fn(&Correlation, &Message) + Send + Sync + 'static,
    {
        Self::new(ExactMatcher::new(topic), handle)
    }

    pub fn matches(
        &self,
        topic: &str,
    ) -> bool {
        self.matcher.matches(topic)
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub(crate) fn call(
        &self,
        ctx: &Correlation,
        msg: &Message,
    ) {
        (self.handle)(ctx, msg)
    }
}

impl fmt::Debug for Handler {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Handler")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}
