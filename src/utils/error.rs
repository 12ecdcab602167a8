use crate::domain::ports::PublishError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("invalid vlan {vlan_id}: must be within range 1-4094")]
    InvalidVlan { vlan_id: i64 },

    #[error("invalid fabric zone {zone:?}: {reason}")]
    InvalidZone { zone: String, reason: String },

    #[error("failed to encode port task: {0}")]
    EncodingError(#[source] serde_json::Error),

    #[error("failed to decode port task: {0}")]
    DecodingError(#[source] serde_json::Error),

    #[error("failed to dispatch to fabric broker on {subject}: {source}")]
    DispatchError {
        subject: String,
        #[source]
        source: PublishError,
    },

    #[error("Failed to connect to NATS at {url}: {source}")]
    BrokerConnectError {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dispatch to {subject} was cancelled before the broker acknowledged it")]
    Cancelled { subject: String },

    #[error("dispatch to {subject} exceeded its deadline of {timeout:?}")]
    DeadlineExceeded { subject: String, timeout: Duration },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// 錯誤分類，對應 HTTP 邊界與日誌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Encoding,
    Dispatch,
    Cancellation,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AggregatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidVlan { .. } | Self::InvalidZone { .. } => ErrorCategory::Validation,
            Self::EncodingError(_) | Self::DecodingError(_) => ErrorCategory::Encoding,
            Self::DispatchError { .. } | Self::BrokerConnectError { .. } => {
                ErrorCategory::Dispatch
            }
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => ErrorCategory::Cancellation,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if let Self::BrokerConnectError { .. } = self {
            return ErrorSeverity::Critical;
        }
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Cancellation | ErrorCategory::Dispatch => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Encoding => ErrorSeverity::Critical,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidVlan { .. } => "Use a VLAN ID between 1 and 4094",
            Self::InvalidZone { .. } => {
                "Fabric zones may only contain ASCII letters, digits and hyphens"
            }
            Self::EncodingError(_) | Self::DecodingError(_) => {
                "This is an internal defect; report it together with the request payload"
            }
            Self::BrokerConnectError { .. } => {
                "Start the NATS server or point NATS_URL / --nats-url at a reachable one"
            }
            Self::DispatchError { .. } => {
                "Check that the NATS broker is reachable, then resubmit the request"
            }
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => {
                "The broker did not acknowledge in time; resubmit the request"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the command line flags, environment variables and config file"
            }
            Self::IoError(_) => "Check file permissions and that the path exists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => format!("Request rejected: {}", self),
            ErrorCategory::Encoding => "Internal error while building the task".to_string(),
            ErrorCategory::Dispatch | ErrorCategory::Cancellation => {
                "Failed to dispatch task".to_string()
            }
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
