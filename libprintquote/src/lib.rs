//! PrintQuote - client tools for a print-shop job costing service
//!
//! This library provides currency display formatting, a persisted display
//! currency preference, and a typed client for the costing backend.

pub mod api;
pub mod config;
pub mod currency;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod storage;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use currency::{Currency, CurrencyInfo};
pub use error::{PrintQuoteError, Result};
pub use preferences::Preferences;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
