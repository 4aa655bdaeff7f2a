//! Error taxonomy for reconciliation.

use crate::types::{Operation, ResourceKind};
use crate::validate::ValidationIssue;

/// Result type alias for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core.
///
/// Validation and conversion errors carry enough detail to fix the input.
/// Remote errors keep the client's classification in `source`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Desired configuration failed pre-flight checks. Nothing was sent.
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationIssue>),

    /// A variant tag the codec does not know.
    #[error("unsupported {kind} variant '{tag}'")]
    UnsupportedVariant {
        /// Resource kind the tag belongs to.
        kind: ResourceKind,
        /// The unrecognized tag.
        tag: String,
    },

    /// A variant payload is missing a required field or has the wrong type.
    #[error("malformed '{tag}' payload: field '{field}' {expected}")]
    MalformedPayload {
        /// Variant tag of the payload.
        tag: String,
        /// Offending field path.
        field: String,
        /// What was expected instead.
        expected: &'static str,
    },

    /// A lookup that requires presence found nothing.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Resource kind.
        kind: ResourceKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// The remote call failed.
    #[error("{operation} {kind} failed: {source}")]
    Remote {
        /// Operation being performed.
        operation: Operation,
        /// Resource kind.
        kind: ResourceKind,
        /// Classified client error.
        #[source]
        source: uptimekit::Error,
    },

    /// The change cannot be applied in place.
    #[error("changing {kind} {field} from '{from}' to '{to}' requires replacement")]
    ReplaceRequired {
        /// Resource kind.
        kind: ResourceKind,
        /// Immutable field (`type` or `channel`).
        field: &'static str,
        /// Current tag.
        from: String,
        /// Desired tag.
        to: String,
    },

    /// The remote write succeeded but its response could not be materialized.
    #[error("{operation} {kind} succeeded but the response could not be converted: {source}")]
    Conversion {
        /// Operation that succeeded remotely.
        operation: Operation,
        /// Resource kind.
        kind: ResourceKind,
        /// Underlying codec error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a client error with the operation that produced it.
    pub fn remote(operation: Operation, kind: ResourceKind, source: uptimekit::Error) -> Self {
        Self::Remote {
            operation,
            kind,
            source,
        }
    }

    /// Create a malformed-payload error.
    pub fn malformed(tag: impl Into<String>, field: impl Into<String>, expected: &'static str) -> Self {
        Self::MalformedPayload {
            tag: tag.into(),
            field: field.into(),
            expected,
        }
    }

    /// Validation issues, if this is a validation error.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }

    /// Whether the user can fix this by editing the desired configuration.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ReplaceRequired { .. })
    }

    /// Whether this is a codec error (unknown tag or malformed payload).
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVariant { .. } | Self::MalformedPayload { .. } | Self::Conversion { .. }
        )
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "no issues".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
