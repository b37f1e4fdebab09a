//! Внутрипроцессный брокер publish/subscribe.
//!
//! - `broker`: регистрация топиков и обработчиков, синхронная доставка.
//! - `correlation`: явный корреляционный контекст (`tx_id`, источник, отмена).
//! - `handler`: описание обработчика (паттерн + функция).
//! - `idgen`: генераторы идентификаторов сообщений.
//! - `matcher`: стратегии сопоставления паттернов с именами топиков.
//! - `message`: сообщение, payload и необязательные поля.
//! - `registry` (приватный): реестры и пересчёт привязок.

pub mod broker;
pub mod correlation;
pub mod handler;
pub mod idgen;
pub mod matcher;
pub mod message;
mod registry;

pub use broker::*;
pub use correlation::*;
pub use handler::*;
pub use idgen::*;
pub use matcher::*;
pub use message::*;
