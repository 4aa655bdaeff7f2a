//! # uptimekit
//!
//! Blocking client for the Uptime Monitor REST API.
//!
//! This crate provides:
//! - Wire models for monitors, contacts, status pages and the account
//! - The [`Backend`] trait every remote call goes through
//! - [`HttpBackend`], a `ureq`-based implementation speaking the JSON envelope
//! - [`MockBackend`], an in-memory implementation for tests
//!
//! ## Example
//!
//! ```no_run
//! use uptimekit::{Backend, ClientConfig, HttpBackend};
//!
//! let config = ClientConfig::from_env().expect("UPTIME_API_KEY not set");
//! let backend = HttpBackend::new(&config);
//!
//! let account = backend.get_account().expect("account lookup failed");
//! println!("{} monitors on plan {}", account.monitors_count, account.current_plan);
//! ```
//!
//! ## Error Classification
//!
//! Every failure maps onto an [`ErrorCategory`] (`not-found`, `unauthorized`,
//! `server`, `network`, `decode`, `config`). Not-found on `get_*` is reported
//! as `Ok(None)`; on `update_*` and `delete_*` it is [`Error::NotFound`] and
//! the caller decides whether that matters.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod models;

pub use backend::http::HttpBackend;
pub use backend::{Backend, MockBackend};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, ErrorCategory, Result};
pub use models::{
    Account, Contact, CreateContactRequest, CreateMonitorRequest, CreateStatusPageRequest,
    Monitor, Pagination, StatusPage, UpdateContactRequest, UpdateMonitorRequest,
    UpdateStatusPageRequest,
};
