pub mod settings;

pub use settings::{IdGeneratorKind, Settings};
