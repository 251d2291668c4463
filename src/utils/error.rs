use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Navigation failed: {status}")]
    StatusError { status: u16, route: String },

    #[error("Not a navigable route: {href:?}")]
    RejectedRoute { href: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Script {source_hint} failed: {message}")]
    ScriptError { source_hint: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Navigation,
    Configuration,
    System,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RouterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RouterError::HttpError(_) => ErrorCategory::Network,
            RouterError::StatusError { .. } | RouterError::RejectedRoute { .. } => {
                ErrorCategory::Navigation
            }
            RouterError::ConfigValidationError { .. }
            | RouterError::MissingConfigError { .. }
            | RouterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RouterError::IoError(_) | RouterError::SerializationError(_) => ErrorCategory::System,
            RouterError::ScriptError { .. } => ErrorCategory::Script,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RouterError::RejectedRoute { .. } | RouterError::ScriptError { .. } => {
                ErrorSeverity::Low
            }
            RouterError::HttpError(_) | RouterError::StatusError { .. } => ErrorSeverity::Medium,
            RouterError::ConfigValidationError { .. }
            | RouterError::MissingConfigError { .. }
            | RouterError::InvalidConfigValueError { .. }
            | RouterError::SerializationError(_) => ErrorSeverity::High,
            RouterError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RouterError::HttpError(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            RouterError::HttpError(e) if e.is_connect() => {
                "Could not connect to the server".to_string()
            }
            RouterError::StatusError { status, route } => {
                format!("The server refused {} with HTTP {}", route, status)
            }
            RouterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            RouterError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the server is running and the base URL is correct",
            ErrorCategory::Navigation => "Navigate again or pick another route",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Script => "Check the page module registered for this script",
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_reads_like_a_navigation_failure() {
        let err = RouterError::StatusError {
            status: 500,
            route: "/orders".to_string(),
        };
        assert_eq!(err.to_string(), "Navigation failed: 500");
        assert_eq!(err.category(), ErrorCategory::Navigation);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_serde_json_errors_convert() {
        let err: RouterError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, RouterError::SerializationError(_)));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = RouterError::MissingConfigError {
            field: "server.base_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("server.base_url"));
    }
}
