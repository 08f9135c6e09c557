use thiserror::Error;
use validator::ValidationErrors;

use crate::supabase::ApiError;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum ZapError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Onboarding failed while writing {step} (completed: {})", .completed.join(", "))]
    Onboarding {
        step: &'static str,
        completed: Vec<&'static str>,
        #[source]
        source: Box<ZapError>,
    },
}

pub type Result<T> = std::result::Result<T, ZapError>;

impl From<ValidationErrors> for ZapError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        ZapError::Validation(messages.join("; "))
    }
}

impl From<bincode::Error> for ZapError {
    fn from(e: bincode::Error) -> Self {
        ZapError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ZapError {
    fn from(e: serde_json::Error) -> Self {
        ZapError::Serialization(e.to_string())
    }
}

impl ZapError {
    /// True for validation failures raised before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, ZapError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 7, message = "Frequency must be between 1 and 7"))]
        frequency: u8,
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let sample = Sample {
            name: String::new(),
            frequency: 9,
        };
        let err: ZapError = sample.validate().unwrap_err().into();

        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation failed: Frequency must be between 1 and 7; Name is required"
        );
    }

    #[test]
    fn test_onboarding_error_lists_completed_writes() {
        let err = ZapError::Onboarding {
            step: "goals",
            completed: vec!["alunos", "body_metrics"],
            source: Box::new(ZapError::NotAuthenticated),
        };

        assert_eq!(
            err.to_string(),
            "Onboarding failed while writing goals (completed: alunos, body_metrics)"
        );
    }
}
