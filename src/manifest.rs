//! Declarative manifest: the desired set of resources, keyed by manifest name.
//!
//! ```toml
//! [contacts.ops]
//! name = "Ops"
//! [contacts.ops.slack]
//! webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"
//!
//! [monitors.api]
//! name = "API"
//! contacts = ["contact.ops"]
//! [monitors.api.https]
//! url = "https://api.example.com/health"
//! ```
//!
//! Monitor `contacts` and status page `monitors` accept a server id or a
//! `contact.<name>` / `monitor.<name>` reference to another manifest entry.

use anyhow::{Context, Result};
use reconcile::{ContactConfig, MonitorConfig, ResourceKind, StatusPageConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub contacts: BTreeMap<String, ContactConfig>,

    #[serde(default)]
    pub monitors: BTreeMap<String, MonitorConfig>,

    #[serde(default)]
    pub status_pages: BTreeMap<String, StatusPageConfig>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        log::debug!(
            "Loaded manifest from {} ({} entries)",
            path.display(),
            manifest.len()
        );
        Ok(manifest)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.contacts.len() + self.monitors.len() + self.status_pages.len()
    }
}

// ============================================================================
// References
// ============================================================================

/// Split `contact.ops` into its kind and manifest name.
pub fn parse_reference(value: &str) -> Option<(ResourceKind, &str)> {
    let (prefix, name) = value.split_once('.')?;
    let kind = match prefix {
        "contact" => ResourceKind::Contact,
        "monitor" => ResourceKind::Monitor,
        _ => return None,
    };
    (!name.is_empty()).then_some((kind, name))
}

/// Replace references with ids using `lookup`.
///
/// Plain ids pass through. References `lookup` cannot resolve are kept
/// verbatim and appended to `unresolved`.
pub fn resolve_references(
    values: &[String],
    lookup: impl Fn(ResourceKind, &str) -> Option<String>,
    unresolved: &mut Vec<String>,
) -> Vec<String> {
    values
        .iter()
        .map(|value| match parse_reference(value) {
            Some((kind, name)) => lookup(kind, name).unwrap_or_else(|| {
                unresolved.push(value.clone());
                value.clone()
            }),
            None => value.clone(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
