pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod selection;

pub use config::{AppConfig, SelectionSettings, SyncSettings};
pub use error::DatebookError;
pub use logging::{LogEntry, LogLevel, Loggable};
pub use result::DatebookResult;
pub use selection::MultiSelection;
