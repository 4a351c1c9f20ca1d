//! Error types for foamcase-core.
//!
//! Store, migration, accessor and generator failures all surface as
//! `CaseError`. Writer validation failures are not errors in this sense; they
//! are collected by the writer (see `crate::writer::WriteError`) and reported
//! to the caller as a count.

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type CaseResult<T> = Result<T, CaseError>;

#[derive(Debug, Error)]
pub enum CaseError {
    /// No node matches the query.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The node exists but does not carry the attribute.
    #[error("attribute '{name}' not found at {path}")]
    AttributeNotFound { path: String, name: String },

    /// A stored value could not be read as the requested type.
    #[error("cannot read '{value}' at {path} as {expected}")]
    Conversion {
        path: String,
        value: String,
        expected: String,
    },

    /// The document cannot be brought to the current schema.
    #[error("incompatible case version {found} (supported: {min}..={current})")]
    IncompatibleVersion { found: u32, min: u32, current: u32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    /// An enumerated value reached a generator that has no rule for it.
    #[error("no dispatch rule: {0}")]
    Dispatch(String),

    /// A referenced external resource (CSV table) is missing or unreadable.
    #[error("resource error: {0}")]
    Resource(String),

    #[error("xml error: {0}")]
    Xml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CaseError {
    pub fn path_not_found(path: impl ToString) -> Self {
        Self::PathNotFound(path.to_string())
    }

    pub fn conversion(path: impl ToString, value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Conversion {
            path: path.to_string(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn xml(msg: impl ToString) -> Self {
        Self::Xml(msg.to_string())
    }

    /// True for errors that mean "the configuration lacks something".
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::AttributeNotFound { .. })
    }
}

impl From<quick_xml::Error> for CaseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::xml(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for CaseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(e)
    }
}
