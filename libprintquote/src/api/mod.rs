//! Typed client for the print-shop costing backend
//!
//! The backend is treated as a black box; this module only knows the request
//! and response shapes. Endpoints are grouped the way the backend routes
//! them (`/api/jobs/*`, `/api/cost/*`, ...).
//!
//! ```no_run
//! use std::sync::Arc;
//! use libprintquote::api::ApiClient;
//! use libprintquote::api::types::JobListQuery;
//! use libprintquote::config::ApiConfig;
//! use libprintquote::storage::FileStore;
//!
//! # async fn example() -> libprintquote::Result<()> {
//! let session = Arc::new(FileStore::new("~/.local/share/printquote/preferences.json"));
//! let client = ApiClient::new(&ApiConfig::default(), session)?;
//!
//! client.login("ana@example.com", "hunter22").await?;
//! let page = client.jobs().list(&JobListQuery::default()).await?;
//! println!("{} jobs", page.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{ApiClient, TOKEN_KEY, USER_KEY};
pub use endpoints::{CostingApi, CurrencyApi, ExportApi, ExportKind, JobsApi, SettingsApi};
