use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let msg = if message.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            message
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Unauthorized(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::Unknown(msg),
        }
    }

    /// Build an error from a failed response, pulling the message out of
    /// PostgREST (`message`, `hint`) or GoTrue (`msg`, `error_description`) bodies
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, extract_message(&body))
    }

    /// Network failures and 5xx responses are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::NetworkError(_) | ApiError::ServerError(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::NetworkError(e.to_string())
    }
}

fn extract_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let message = ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    match (message, value.get("hint").and_then(Value::as_str)) {
        (Some(message), Some(hint)) => format!("{} ({})", message, hint),
        (Some(message), None) => message,
        (None, _) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "duplicate".to_string()),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, String::new()),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_empty_message_uses_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, String::new());
        assert_eq!(err.to_string(), "Resource not found: Not Found");
    }

    #[test]
    fn test_extract_postgrest_message_with_hint() {
        let body = r#"{"code":"42501","message":"permission denied for table alunos","hint":"check RLS"}"#;
        assert_eq!(
            extract_message(body),
            "permission denied for table alunos (check RLS)"
        );
    }

    #[test]
    fn test_extract_gotrue_message() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(extract_message(body), "Invalid login credentials");
    }

    #[test]
    fn test_extract_plain_text() {
        assert_eq!(extract_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn test_transient_errors() {
        assert!(ApiError::NetworkError("reset".to_string()).is_transient());
        assert!(ApiError::ServerError("boom".to_string()).is_transient());
        assert!(!ApiError::BadRequest("nope".to_string()).is_transient());
    }
}
