use thiserror::Error;

pub const FORMAT_ERROR_MESSAGE: &str =
    "The model returned an invalid data format. Please try your search again.";

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch real estate data. The model may be unable to find listings for this area, or there might be a network issue.";

#[derive(Error, Debug)]
pub enum GemsError {
    #[error("{message}")]
    Configuration { message: String },

    #[error("Invalid response format: {source}")]
    Format {
        #[source]
        source: serde_json::Error,
    },

    #[error("Search request failed: {message}")]
    Fetch { message: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid value for {field} ({value:?}): {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Format,
    Fetch,
    Input,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GemsError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Format { .. } => ErrorCategory::Format,
            Self::Fetch { .. } | Self::Transport(_) => ErrorCategory::Fetch,
            Self::Validation { .. } => ErrorCategory::Input,
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) | Self::Zip(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Format | ErrorCategory::Fetch => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// The single message shown to the user when a search fails.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Configuration { message } => message.clone(),
            Self::Format { .. } => FORMAT_ERROR_MESSAGE.to_string(),
            Self::Fetch { .. } | Self::Transport(_) => FETCH_ERROR_MESSAGE.to_string(),
            Self::Validation { reason, .. } => reason.clone(),
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) | Self::Zip(_) => {
                format!("Could not read or write local data: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set GEMINI_API_KEY (or api_key under [gemini] in the config file) and try again"
            }
            ErrorCategory::Format => "Run the same search again; the model output varies between attempts",
            ErrorCategory::Fetch => "Check your network connection and try again later",
            ErrorCategory::Input => "Enter a 5-digit ZIP code",
            ErrorCategory::Storage => "Check that the output and session paths are writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, GemsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_fetch_messages_are_distinct() {
        let format = GemsError::Format {
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        let fetch = GemsError::fetch("status 503");

        assert_eq!(format.category(), ErrorCategory::Format);
        assert_eq!(fetch.category(), ErrorCategory::Fetch);
        assert_eq!(format.user_friendly_message(), FORMAT_ERROR_MESSAGE);
        assert_eq!(fetch.user_friendly_message(), FETCH_ERROR_MESSAGE);
    }

    #[test]
    fn test_configuration_message_is_verbatim() {
        let err = GemsError::configuration("API_KEY environment variable is not set.");
        assert_eq!(
            err.user_friendly_message(),
            "API_KEY environment variable is not set."
        );
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_validation_uses_reason() {
        let err = GemsError::validation("zip", "123", "Please enter a valid 5-digit ZIP code.");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(
            err.user_friendly_message(),
            "Please enter a valid 5-digit ZIP code."
        );
    }
}
