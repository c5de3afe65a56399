// TodoStore - Persistent task list over a pluggable key-value medium

pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod medium;
pub mod models;
pub mod notify;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::{Config, MediumKind};
pub use error::{MediumError, Result, TodoError};
pub use filter::{Filter, ParseFilterError};
pub use medium::{FileMedium, Medium, MemoryMedium, SqliteMedium};
pub use models::{TodoItem, now_ms};
pub use notify::{Level, Notification};
pub use store::{DEFAULT_KEY, TodoStore};
