use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reconcile::{ContactState, MonitorState, StatusPageState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

// ============================================================================
// State Structures
// ============================================================================

/// One managed resource: its manifest name and last known canonical state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracked<S> {
    pub name: String,
    pub state: S,
}

/// Everything uptimectl manages, keyed by server-assigned id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStore {
    pub version: u32,

    /// Last time the state was written
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub contacts: BTreeMap<String, Tracked<ContactState>>,

    #[serde(default)]
    pub monitors: BTreeMap<String, Tracked<MonitorState>>,

    #[serde(default)]
    pub status_pages: BTreeMap<String, Tracked<StatusPageState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_updated: Utc::now(),
            contacts: BTreeMap::new(),
            monitors: BTreeMap::new(),
            status_pages: BTreeMap::new(),
        }
    }
}

// ============================================================================
// StateStore Implementation
// ============================================================================

impl StateStore {
    /// Load state from disk, or return an empty store if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let store: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if store.version > STATE_VERSION {
            bail!(
                "State file {} has version {}, newer than supported version {}",
                path.display(),
                store.version,
                STATE_VERSION
            );
        }

        log::debug!("Loaded state from {}", path.display());
        Ok(store)
    }

    /// Stamp and write state, replacing the file atomically
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let file_name = path
            .file_name()
            .with_context(|| format!("State path has no file name: {}", path.display()))?;
        let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.monitors.is_empty() && self.status_pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contacts.len() + self.monitors.len() + self.status_pages.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
