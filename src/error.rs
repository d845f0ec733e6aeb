use thiserror::Error;

/// Coarse classification used by callers to decide whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Configuration,
    CountMismatch,
    Transient,
    Cancelled,
    CycleDetected,
    InvalidData,
    /// Api server refused the request (authorization, validation)
    Rejected,
}

impl ErrorKind {
    /// Only transient and cancelled failures may heal without a configuration change
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("targetlist size mismatch: {expected} targets were expected but {actual} were fetched from the cluster (missing: {})", missing.join(", "))]
    CountMismatch {
        expected: usize,
        actual: usize,
        missing: Vec<String>,
    },
    #[error("circular component reference: {0}")]
    CycleDetected(String),
    #[error("invalid data in {origin}: {message}")]
    InvalidData { origin: String, message: String },
    #[error("unable to construct label selector: {0}")]
    Selector(#[from] labelselector::Error),
    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),
    #[error("failed to read {origin}: {source}")]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resolution cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("{import}: {source}")]
    Import {
        import: String,
        #[source]
        source: Box<Error>,
    },
}
pub type Result<T> = std::result::Result<T, Error>;

// Throttling and server side failures heal on their own, other api errors need
// someone to change permissions or the request
fn kube_error_kind(e: &kube::Error) -> ErrorKind {
    match e {
        kube::Error::Api(response) => match response.code {
            404 => ErrorKind::NotFound,
            429 | 500..=599 => ErrorKind::Transient,
            _ => ErrorKind::Rejected,
        },
        kube::Error::SerdeError(_) => ErrorKind::InvalidData,
        _ => ErrorKind::Transient,
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Configuration(_) | Self::Selector(_) => ErrorKind::Configuration,
            Self::CountMismatch { .. } => ErrorKind::CountMismatch,
            Self::CycleDetected(_) => ErrorKind::CycleDetected,
            Self::InvalidData { .. } => ErrorKind::InvalidData,
            Self::Kube(e) => kube_error_kind(e),
            Self::Read { .. } => ErrorKind::Transient,
            Self::Cancelled | Self::DeadlineExceeded => ErrorKind::Cancelled,
            Self::Import { source, .. } => source.kind(),
        }
    }

    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Attribute error to a declared import
    pub fn for_import(self, import: &str) -> Self {
        Self::Import {
            import: import.to_owned(),
            source: Box::new(self),
        }
    }
}
