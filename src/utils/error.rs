use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchoolError {
    #[error("Remote store configuration is absent")]
    ConfigurationAbsent,

    #[error("Invalid configuration for '{field}': {reason}")]
    ConfigurationInvalid { field: String, reason: String },

    #[error("Failed to read collection '{collection}': {message}")]
    BackendRead { collection: String, message: String },

    #[error("Failed to write to collection '{collection}': {message}")]
    BackendWrite { collection: String, message: String },

    #[error("Failed to delete from collection '{collection}': {message}")]
    BackendDelete { collection: String, message: String },

    #[error("Incorrect username or password")]
    Authentication,

    #[error("Admin login required")]
    NotAuthenticated,

    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Backend,
    Auth,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SchoolError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchoolError::ConfigurationInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchoolError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SchoolError::ConfigurationAbsent | SchoolError::ConfigurationInvalid { .. } => {
                ErrorCategory::Configuration
            }
            SchoolError::BackendRead { .. }
            | SchoolError::BackendWrite { .. }
            | SchoolError::BackendDelete { .. }
            | SchoolError::Http(_) => ErrorCategory::Backend,
            SchoolError::Authentication | SchoolError::NotAuthenticated => ErrorCategory::Auth,
            SchoolError::Validation { .. } => ErrorCategory::Validation,
            SchoolError::Io(_) | SchoolError::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 缺少遠端設定是預期情況，直接改用本地存儲
            SchoolError::ConfigurationAbsent => ErrorSeverity::Low,
            SchoolError::Authentication
            | SchoolError::NotAuthenticated
            | SchoolError::Validation { .. } => ErrorSeverity::Low,
            SchoolError::ConfigurationInvalid { .. }
            | SchoolError::BackendRead { .. }
            | SchoolError::BackendWrite { .. }
            | SchoolError::BackendDelete { .. }
            | SchoolError::Http(_) => ErrorSeverity::Medium,
            SchoolError::Serialization(_) => ErrorSeverity::High,
            SchoolError::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SchoolError::ConfigurationAbsent => {
                "No database credentials found. Using in-memory sample data.".to_string()
            }
            SchoolError::ConfigurationInvalid { field, .. } => format!(
                "Database configuration '{}' is not usable. Using in-memory sample data.",
                field
            ),
            SchoolError::BackendRead { collection, .. } => {
                format!("Could not load {} right now.", collection)
            }
            SchoolError::BackendWrite { collection, .. } => {
                format!("Could not save to {}. Nothing was added.", collection)
            }
            SchoolError::BackendDelete { collection, .. } => {
                format!("Could not delete from {}.", collection)
            }
            SchoolError::Authentication => "Incorrect Username or Password".to_string(),
            SchoolError::NotAuthenticated => "Please log in to the Admin Portal first.".to_string(),
            SchoolError::Validation { message, .. } => message.clone(),
            SchoolError::Http(_) => "The database service could not be reached.".to_string(),
            SchoolError::Io(e) => format!("File error: {}", e),
            SchoolError::Serialization(_) => "Received data in an unexpected format.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the [remote] section and the service-account credential bundle"
            }
            ErrorCategory::Backend => "Check network access to the database and try again",
            ErrorCategory::Auth => "Log in with the admin username and password",
            ErrorCategory::Validation => "Fill in the required fields and try again",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, SchoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_is_low_severity() {
        let err = SchoolError::ConfigurationAbsent;
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_backend_failures_share_category() {
        let errors = [
            SchoolError::BackendRead {
                collection: "students".into(),
                message: "boom".into(),
            },
            SchoolError::BackendWrite {
                collection: "students".into(),
                message: "boom".into(),
            },
            SchoolError::BackendDelete {
                collection: "students".into(),
                message: "boom".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.category(), ErrorCategory::Backend);
            assert_eq!(err.severity(), ErrorSeverity::Medium);
        }
    }

    #[test]
    fn test_user_friendly_message_mentions_collection() {
        let err = SchoolError::BackendWrite {
            collection: "teachers".into(),
            message: "503".into(),
        };
        assert!(err.user_friendly_message().contains("teachers"));
        assert_eq!(
            SchoolError::Authentication.user_friendly_message(),
            "Incorrect Username or Password"
        );
    }
}
