use thiserror::Error;

/// Transport or HTTP-status failure while reaching a job site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

/// A listing element that could not be turned into an acceptable card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("listing element matched no title selector")]
    NoTitleElement,

    #[error("listing element has an empty title")]
    MissingTitle,

    #[error("listing element has no usable link")]
    MissingUrl,
}

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Fetch failed: {0}")]
    FetchError(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    ExtractionError(#[from] ExtractionError),

    #[error("Source '{source_name}' failed: {message}")]
    AdapterFailure {
        source_name: String,
        message: String,
    },

    #[error("Unknown source: {name}")]
    UnknownSource { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Job with ID {id} not found")]
    NotFound { id: i64 },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Cache error: {message}")]
    CacheError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Extraction,
    Source,
    Configuration,
    Validation,
    Storage,
    Cache,
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
            Self::FetchError(_) => ErrorCategory::Network,
            Self::ExtractionError(_) => ErrorCategory::Extraction,
            Self::AdapterFailure { .. } | Self::UnknownSource { .. } => ErrorCategory::Source,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } | Self::NotFound { .. } => ErrorCategory::Validation,
            Self::IoError(_) | Self::SerializationError(_) | Self::StorageError { .. } => {
                ErrorCategory::Storage
            }
            Self::CacheError { .. } => ErrorCategory::Cache,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ExtractionError(_) | Self::UnknownSource { .. } | Self::CacheError { .. } => {
                ErrorSeverity::Low
            }
            Self::FetchError(_) | Self::AdapterFailure { .. } => ErrorSeverity::Medium,
            Self::ValidationError { .. } | Self::NotFound { .. } => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::StorageError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and retry later",
            ErrorCategory::Extraction => "The site markup may have changed; update its selectors",
            ErrorCategory::Source => "Use one of: linkedin, careerjet, timesjobs",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Validation => "Check the job id and field values",
            ErrorCategory::Storage => "Check that the storage path is writable and not corrupted",
            ErrorCategory::Cache => "Results are still served without the cache",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { id } => format!("No saved job with ID {}", id),
            Self::ValidationError { message } => format!("Invalid input: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Bad setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
