//! Offline planning: what an apply would do for one instance.

use crate::error::{Error, Result};
use crate::resource::{ResourceType, UpdateDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planned action for one resource instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<D> {
    /// Not tracked yet
    Create,
    /// Tracked and drifted; the delta carries only changed fields
    Update(D),
    /// An immutable discriminator changed; delete then create
    Replace {
        field: &'static str,
        from: String,
        to: String,
    },
    /// Tracked but no longer desired
    Delete,
    NoChange,
}

impl<D> Action<D> {
    /// Marker shown next to the instance in plan output.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update(_) => "~",
            Self::Replace { .. } => "-/+",
            Self::Delete => "-",
            Self::NoChange => " ",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl<D: UpdateDelta> fmt::Display for Action<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update(delta) => write!(f, "update ({})", delta.changed_fields().join(", ")),
            Self::Replace { field, from, to } => write!(f, "replace ({field}: {from} -> {to})"),
            Self::Delete => f.write_str("delete"),
            Self::NoChange => f.write_str("no change"),
        }
    }
}

/// Decide what to do with one instance.
///
/// Runs the validator and request builder only. A desired configuration
/// with validation issues fails the plan for that instance.
pub fn plan<R: ResourceType>(
    desired: Option<&R::Desired>,
    prior: Option<&R::State>,
) -> Result<Action<R::Delta>> {
    let Some(desired) = desired else {
        return Ok(if prior.is_some() { Action::Delete } else { Action::NoChange });
    };

    let issues = R::validate(desired);
    if !issues.is_empty() {
        return Err(Error::Validation(issues));
    }

    let Some(prior) = prior else {
        return Ok(Action::Create);
    };

    match R::build_update(desired, prior) {
        Ok(delta) if delta.is_empty() => Ok(Action::NoChange),
        Ok(delta) => Ok(Action::Update(delta)),
        Err(Error::ReplaceRequired { field, from, to, .. }) => Ok(Action::Replace { field, from, to }),
        Err(e) => Err(e),
    }
}

/// Counts of planned actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl PlanSummary {
    pub fn add<D>(&mut self, action: &Action<D>) {
        match action {
            Action::Create => self.create += 1,
            Action::Update(_) => self.update += 1,
            Action::Replace { .. } => self.replace += 1,
            Action::Delete => self.delete += 1,
            Action::NoChange => self.no_change += 1,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.create + self.update + self.replace + self.delete
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn merge(&mut self, other: &Self) {
        self.create += other.create;
        self.update += other.update;
        self.replace += other.replace;
        self.delete += other.delete;
        self.no_change += other.no_change;
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete",
            self.create, self.update, self.replace, self.delete
        )
    }
}
