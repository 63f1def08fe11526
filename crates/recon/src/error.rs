use serde::Serialize;
use thiserror::Error;

/// Failure kinds surfaced to callers of `reconcile`.
///
/// Every [`ReconError`] maps onto exactly one kind. The HTTP layer in front
/// of the engine only needs the kind to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UpstreamUnavailable,
    UpstreamRejected,
    NotFound,
    Unknown,
}

impl ErrorKind {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UpstreamUnavailable => 503,
            Self::UpstreamRejected => 400,
            Self::NotFound => 404,
            Self::Unknown => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpstreamUnavailable => write!(f, "upstream_unavailable"),
            Self::UpstreamRejected => write!(f, "upstream_rejected"),
            Self::NotFound => write!(f, "not_found"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// The collaborator could not be reached or signalled it is unavailable.
    #[error("{source_name}: service unavailable: {message}")]
    UpstreamUnavailable { source_name: String, message: String },
    /// The collaborator rejected the request as invalid.
    #[error("{source_name}: request rejected: {message}")]
    UpstreamRejected { source_name: String, message: String },
    /// The subject or organization does not exist upstream.
    #[error("{source_name}: not found: {message}")]
    NotFound { source_name: String, message: String },
    /// Any other collaborator failure.
    #[error("{source_name}: {message}")]
    Unknown { source_name: String, message: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty source path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Malformed record in a source file.
    #[error("{file}, line {line}: {message}")]
    Parse { file: String, line: u64, message: String },
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl ReconError {
    pub fn unavailable(source_name: &str, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable { source_name: source_name.into(), message: message.into() }
    }

    pub fn rejected(source_name: &str, message: impl Into<String>) -> Self {
        Self::UpstreamRejected { source_name: source_name.into(), message: message.into() }
    }

    pub fn not_found(source_name: &str, message: impl Into<String>) -> Self {
        Self::NotFound { source_name: source_name.into(), message: message.into() }
    }

    pub fn unknown(source_name: &str, message: impl Into<String>) -> Self {
        Self::Unknown { source_name: source_name.into(), message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamRejected { .. } | Self::ConfigValidation(_) | Self::Parse { .. } => {
                ErrorKind::UpstreamRejected
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unknown { .. } | Self::ConfigParse(_) | Self::Io(_) => ErrorKind::Unknown,
        }
    }
}

impl From<std::io::Error> for ReconError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
