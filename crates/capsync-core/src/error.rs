use std::path::PathBuf;

use thiserror::Error;

/// A resolved template that cannot become a [`crate::PolicyDocument`].
///
/// Always recoverable: the offending document is recorded as
/// `InvalidDocument` and the batch moves on.
#[derive(Debug, Error)]
pub enum InvalidDocumentError {
    #[error("Malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Document root must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Document has no non-empty string `displayName`")]
    MissingDisplayName,

    #[error("Duplicate displayName '{display_name}' (first declared in {first_file})")]
    DuplicateDisplayName {
        display_name: String,
        first_file: String,
    },

    #[error("Template could not be read: {0}")]
    Unreadable(String),
}

impl InvalidDocumentError {
    /// Create a new DuplicateDisplayName error
    pub fn duplicate(display_name: impl Into<String>, first_file: impl Into<String>) -> Self {
        Self::DuplicateDisplayName {
            display_name: display_name.into(),
            first_file: first_file.into(),
        }
    }
}

/// A call to the remote policy store failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect to server: {0}")]
    Connect(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Create a new Connect error
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Create a new Status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a new Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Failures of the template source itself.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Template directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// File name the error refers to, used as the outcome's file identity.
    pub fn file_name(&self) -> String {
        let path = match self {
            Self::NotFound { path } | Self::Io { path, .. } => path,
        };
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Errors that stop a run before any document is processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No policy templates found in {0}")]
    NoTemplates(String),
}
