//! # Reconcile
//!
//! Declarative reconciliation for uptime monitors, notification contacts and
//! status pages.
//!
//! The crate turns a desired configuration into the minimal set of remote
//! calls that converge the service onto it, and turns the service's
//! responses back into a canonical state that compares stably against the
//! next desired configuration.
//!
//! ## Core Concepts
//!
//! - **Settings Codec**: tagged variant payloads (monitor type, contact
//!   channel) to and from their wire form
//! - **Validator**: pre-flight checks reporting every issue at once
//! - **Normalizer**: URL canonicalization so server reformatting is not drift
//! - **Request Builder**: full create requests and minimal update deltas
//! - **State Materializer**: remote representation to canonical state
//! - **Reconciler**: per-kind create, read, update, delete over a [`uptimekit::Backend`]
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{MonitorConfig, MonitorResource, Reconciler};
//! use reconcile::settings::HttpsSettings;
//! use uptimekit::MockBackend;
//!
//! let backend = MockBackend::new();
//! let monitors = Reconciler::<MonitorResource>::new(&backend);
//!
//! let config = MonitorConfig {
//!     name: "API".into(),
//!     https: Some(HttpsSettings::new("https://api.example.com")),
//!     ..MonitorConfig::default()
//! };
//! let state = monitors.create(&config)?;
//! assert!(monitors.update(&config, &state)? == state);
//! ```

pub mod config;
pub mod error;
pub mod materialize;
pub mod normalize;
pub mod plan;
pub mod reconciler;
pub mod request;
pub mod resource;
pub mod settings;
pub mod state;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use config::{ContactConfig, MonitorConfig, StatusPageConfig};
pub use error::{Error, Result};
pub use plan::{Action, PlanSummary, plan};
pub use reconciler::{Applied, Reconciler};
pub use resource::{ContactResource, MonitorResource, ResourceType, StatusPageResource, UpdateDelta};
pub use settings::{ContactChannel, MonitorType};
pub use state::{ContactState, MonitorState, StatusPageState};
pub use types::{ApplyResult, ExecuteSummary, Operation, ReadOutcome, ResourceKind};
pub use validate::{IssueCode, ValidationIssue};
