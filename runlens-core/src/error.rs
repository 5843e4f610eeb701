//! Error types for manifest parsing and artifact retrieval

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a manifest view or pulling node payloads
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or has the wrong shape
    #[error("Manifest field missing or malformed: {0}")]
    MissingField(String),

    /// A node references a template absent from the template index
    #[error("Node '{node_id}' references unknown template '{template}'")]
    UnknownTemplate { node_id: String, template: String },

    /// The document is internally inconsistent in some other way
    #[error("Inconsistent manifest: {0}")]
    Inconsistent(String),

    /// A timestamp string is not a Zulu (UTC) timestamp
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Start/end timestamps violate ordering
    #[error("Invalid timing: {0}")]
    InvalidTiming(String),

    /// Artifact retrieval requested without a fetcher attached to the run
    #[error("Pulling artifacts requires a fetcher, attach one to the run with `with_fetcher`")]
    NoFetcher,

    /// Artifact name is not declared on the node
    #[error("Artifact '{name}' not found on node '{node_id}' (declared: {declared:?})")]
    UndeclaredArtifact {
        node_id: String,
        name: String,
        declared: Vec<String>,
    },

    /// The fetcher failed
    #[error("Artifact fetch failed: {0}")]
    Fetch(#[source] crate::artifact::FetchError),

    /// The fetched payload is not valid base64
    #[error("Artifact payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload is not valid UTF-8 text
    #[error("Artifact payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The payload could not be read as a tar archive
    #[error("Artifact archive could not be read: {0}")]
    Archive(#[source] std::io::Error),

    /// An output archive has no data member to coerce
    #[error("Output '{0}' archive has no data member")]
    MissingDataMember(String),

    /// An output value could not be coerced to its declared type
    #[error("Output '{name}' is not a valid {declared}: {reason}")]
    Coercion {
        name: String,
        declared: String,
        reason: String,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error while dumping manifests
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested behavior is not implemented for this document
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create a missing-field error from a dotted field path
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField(path.into())
    }

    /// The document references something it does not define
    pub fn is_schema_inconsistency(&self) -> bool {
        matches!(self, Self::UnknownTemplate { .. } | Self::Inconsistent(_))
    }

    /// Retrieval was requested in a state where it cannot succeed
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::NoFetcher | Self::UndeclaredArtifact { .. })
    }

    /// A value is present but in the wrong format
    pub fn is_format_violation(&self) -> bool {
        matches!(self, Self::InvalidTimestamp { .. })
    }
}
