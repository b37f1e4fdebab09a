/// Broker settings loaded from defaults and `HUBBUB_*` environment variables.
pub mod config;
/// Broker and settings error types.
pub mod error;
/// `tracing` setup: filters and console formatting.
pub mod logging;
/// Pub/Sub: Broker, Handler, Message, matchers and correlation.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use config::{IdGeneratorKind, Settings};
/// Error and result types.
pub use error::{BrokerError, BrokerResult, SettingsError};
pub use hubbub_error::{HubbubResult, StackError, StatusCode};
/// Pub/Sub API.
pub use pubsub::{
    Broker, BrokerStats, Correlation, CounterIdGenerator, ExactMatcher, GlobMatcher, Handler,
    IdGenerator, MatchStrategy, Message, MessageOptions, Payload, RegexMatcher, TopicMatcher,
    UuidIdGenerator,
};
