use std::fmt;
use thiserror::Error;

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Request => "request",
            NetworkErrorKind::Body => "body",
            NetworkErrorKind::Other => "network",
        };
        f.write_str(label)
    }
}

/// A failed HTTP exchange, detached from the transport's own error type so
/// it can live inside a `ProbeResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            NetworkErrorKind::Body
        } else if err.is_request() || err.is_builder() || err.is_redirect() {
            NetworkErrorKind::Request
        } else {
            NetworkErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Shell convention for a process ended by SIGINT (128 + 2).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Catalog not found: {path}")]
    NotFound { path: String },

    #[error("Invalid JSON in {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Site '{name}' cannot be probed: {reason}")]
    InvalidSite { name: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Interrupted before all probes settled")]
    Interrupted,
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Network(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProbeError {
    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        ProbeError::Parse {
            context: context.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::ConfigError { .. }
            | ProbeError::MissingConfigError { .. }
            | ProbeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ProbeError::Network(_) | ProbeError::UnexpectedStatus { .. } => ErrorCategory::Network,
            ProbeError::NotFound { .. } | ProbeError::Io(_) => ErrorCategory::Storage,
            ProbeError::Parse { .. } | ProbeError::InvalidSite { .. } => ErrorCategory::Data,
            ProbeError::Interrupted => ErrorCategory::Session,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProbeError::InvalidSite { .. } | ProbeError::Interrupted => ErrorSeverity::Low,
            ProbeError::Network(_) | ProbeError::UnexpectedStatus { .. } => ErrorSeverity::Medium,
            ProbeError::NotFound { .. } | ProbeError::Parse { .. } => ErrorSeverity::High,
            ProbeError::Io(_)
            | ProbeError::ConfigError { .. }
            | ProbeError::MissingConfigError { .. }
            | ProbeError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a session that ends on this error.
    pub fn exit_code(&self) -> i32 {
        if let ProbeError::Interrupted = self {
            return INTERRUPTED_EXIT_CODE;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::NotFound { path } => {
                format!("No site catalog found at '{}'", path)
            }
            ProbeError::Parse { context, .. } => {
                format!("The {} is not valid JSON", context)
            }
            ProbeError::Network(err) => format!("Could not reach the server ({})", err),
            ProbeError::UnexpectedStatus { url, status } => {
                format!("Server at {} answered with HTTP {}", url, status)
            }
            ProbeError::Io(err) => format!("Could not read or write a file: {}", err),
            ProbeError::InvalidSite { name, reason } => {
                format!("Skipped site '{}': {}", name, reason)
            }
            ProbeError::ConfigError { message } => format!("Configuration problem: {}", message),
            ProbeError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            ProbeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            ProbeError::Interrupted => "Interrupted, outstanding probes were cancelled".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the environment variables or the .env file in the working directory"
            }
            ErrorCategory::Network => {
                "Check connectivity, LIST_URL and the proxy settings (PROXY, USE_PROXY)"
            }
            ErrorCategory::Storage => {
                "Run `userprobe sync` to download the catalog and check LIST_FILENAME permissions"
            }
            ErrorCategory::Data => {
                "Delete the local catalog and run `userprobe sync` to fetch a fresh copy"
            }
            ErrorCategory::Session => "Run the probe again and let it finish",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
