//! Resolver error types
//!
//! Every failure the resolver surfaces is typed, so callers can tell
//! retryable transport problems apart from permanent document defects.

use std::fmt;

use thiserror::Error;

use crate::xml::XmlError;

/// Identifier space an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSpace {
    /// Structural nodes (`mets:div`)
    Div,
    /// Leaf files (`mets:file`)
    File,
    /// Descriptive metadata sections (`mets:dmdSec`)
    DmdSec,
}

impl IdSpace {
    /// Local element name that carries ids of this space
    pub fn element_name(self) -> &'static str {
        match self {
            IdSpace::Div => "div",
            IdSpace::File => "file",
            IdSpace::DmdSec => "dmdSec",
        }
    }
}

impl fmt::Display for IdSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

#[derive(Debug, Error)]
pub enum MetsError {
    /// Identifier does not resolve
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Two elements share an identifier
    #[error("Ambiguous {kind} id: {id} is declared more than once")]
    AmbiguousId { kind: IdSpace, id: String },

    /// Required structure or attribute missing or invalid
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Location record is not a plain URL reference
    #[error("Unsupported location type {loctype:?} on file {file_id}")]
    UnsupportedLocationType { file_id: String, loctype: String },

    /// Fetching an externally referenced document failed
    #[error("Network error fetching {url}: {message}")]
    Network {
        url: String,
        message: String,
        retryable: bool,
    },

    /// External pointer chain revisits a document or runs too deep
    #[error("External pointer cycle at {url} (chain: {})", .chain.join(" -> "))]
    Cycle { url: String, chain: Vec<String> },
}

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, MetsError>;

impl MetsError {
    pub fn not_found(kind: impl fmt::Display, id: impl Into<String>) -> Self {
        MetsError::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        MetsError::MalformedDocument(message.into())
    }

    /// The resolution ran out of time before fetching `url`
    pub fn deadline_exceeded(url: &url::Url) -> Self {
        MetsError::Network {
            url: url.to_string(),
            message: "resolution deadline exceeded".to_string(),
            retryable: true,
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, MetsError::Network { retryable: true, .. })
    }

    /// Whether the failure is a defect of the document itself
    pub fn is_document_defect(&self) -> bool {
        matches!(
            self,
            MetsError::AmbiguousId { .. }
                | MetsError::MalformedDocument(_)
                | MetsError::UnsupportedLocationType { .. }
                | MetsError::Cycle { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MetsError::NotFound { .. })
    }
}

impl From<XmlError> for MetsError {
    fn from(err: XmlError) -> Self {
        MetsError::MalformedDocument(err.to_string())
    }
}
