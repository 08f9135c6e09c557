use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{check, decode, ApiError, SupabaseClient};
use crate::config::AuthConfig;
use crate::error::{Result, ZapError};

/// Auth state transitions broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut,
    TokenRefreshed { user_id: String },
}

/// User record returned by GoTrue
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// Session returned by the token and signup endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Result of a signup: the session is absent while email confirmation is pending
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<Session>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a Value,
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

impl Session {
    fn to_auth_config(&self) -> AuthConfig {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp() + self.expires_in);

        AuthConfig {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user_id: self.user.id.to_string(),
            email: self.user.email.clone().unwrap_or_default(),
            expires_at,
        }
    }
}

impl SupabaseClient {
    /// Sign in with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let credentials = PasswordCredentials { email, password };

        tracing::debug!("Signing in as {}", email);

        let response = self
            .request(Method::POST, &url, &self.anon_key)
            .json(&credentials)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status().is_client_error() {
            let err = ApiError::from_response(response).await;
            return Err(ApiError::AuthenticationFailed(inner_message(err)).into());
        }

        let session: Session = decode(response).await?;
        self.store_session(&session)?;
        self.emit(AuthEvent::SignedIn {
            user_id: session.user.id.to_string(),
        });

        tracing::info!("Successfully signed in as {}", email);
        Ok(session)
    }

    /// Register a new account. `metadata` lands in the user's `user_metadata`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Value,
    ) -> Result<SignUpOutcome> {
        let url = self.auth_url("signup");
        let request = SignUpRequest {
            email,
            password,
            data: metadata,
        };

        tracing::debug!("Signing up {}", email);

        let response = self
            .request(Method::POST, &url, &self.anon_key)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::from)?;

        let outcome = match decode::<SignUpResponse>(response).await? {
            SignUpResponse::Session(session) => {
                self.store_session(&session)?;
                self.emit(AuthEvent::SignedIn {
                    user_id: session.user.id.to_string(),
                });
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => {
                tracing::info!("Signup for {} awaits email confirmation", email);
                SignUpOutcome {
                    user,
                    session: None,
                }
            }
        };

        Ok(outcome)
    }

    /// Sign out. The server call is best effort; the local session is
    /// always cleared.
    pub async fn sign_out(&self) -> Result<()> {
        if self.is_authenticated() {
            let url = self.auth_url("logout");
            let token = self.bearer();

            let result = self.request(Method::POST, &url, &token).send().await;
            match result {
                Ok(response) => {
                    if let Err(e) = check(response).await {
                        tracing::warn!("Server-side logout failed: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Server-side logout failed: {}", e),
            }
        }

        {
            let mut config = self.config.lock();
            config.clear_session();
            config.persist()?;
        }

        self.emit(AuthEvent::SignedOut);
        tracing::info!("Signed out");
        Ok(())
    }

    /// Fetch the user behind the current session
    pub async fn get_user(&self) -> Result<AuthUser> {
        if !self.is_authenticated() {
            return Err(ZapError::NotAuthenticated);
        }

        let url = self.auth_url("user");
        tracing::debug!("Fetching current user");

        let response = self
            .send(|token| self.request(Method::GET, &url, token))
            .await?;
        decode(response).await
    }

    /// Exchange the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = {
            let config = self.config.lock();
            if config.auth.refresh_token.is_empty() {
                return Err(ZapError::NotAuthenticated);
            }
            config.auth.refresh_token.clone()
        };

        let url = format!("{}?grant_type=refresh_token", self.auth_url("token"));
        tracing::debug!("Refreshing access token");

        let response = self
            .request(Method::POST, &url, &self.anon_key)
            .json(&RefreshTokenRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            let err = ApiError::from_response(response).await;
            tracing::warn!("Token refresh failed, clearing session: {}", err);
            {
                let mut config = self.config.lock();
                config.clear_session();
                config.persist()?;
            }
            self.emit(AuthEvent::SignedOut);
            return Err(err.into());
        }

        let session: Session = decode(response).await?;
        self.store_session(&session)?;
        self.emit(AuthEvent::TokenRefreshed {
            user_id: session.user.id.to_string(),
        });

        tracing::info!("Successfully refreshed access token");
        Ok(session)
    }

    fn store_session(&self, session: &Session) -> Result<()> {
        let mut config = self.config.lock();
        config.set_session(session.to_auth_config());
        config.persist()
    }
}

fn inner_message(err: ApiError) -> String {
    match err {
        ApiError::AuthenticationFailed(m)
        | ApiError::Unauthorized(m)
        | ApiError::NotFound(m)
        | ApiError::Conflict(m)
        | ApiError::BadRequest(m)
        | ApiError::ServerError(m)
        | ApiError::NetworkError(m)
        | ApiError::Unknown(m) => m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_response_with_session() {
        let body = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": {"id": "6f1c1c5e-2b7e-4c1a-9d51-3f0d8a1b2c3d", "email": "ana@example.com"}
        }"#;

        match serde_json::from_str::<SignUpResponse>(body).unwrap() {
            SignUpResponse::Session(session) => {
                assert_eq!(session.access_token, "a");
                assert_eq!(session.user.email.as_deref(), Some("ana@example.com"));
            }
            SignUpResponse::User(_) => panic!("expected a session"),
        }
    }

    #[test]
    fn test_signup_response_pending_confirmation() {
        let body = r#"{"id": "6f1c1c5e-2b7e-4c1a-9d51-3f0d8a1b2c3d", "email": "ana@example.com"}"#;

        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(body).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[test]
    fn test_session_to_auth_config_prefers_expires_at() {
        let session: Session = serde_json::from_str(
            r#"{
                "access_token": "a",
                "refresh_token": "r",
                "expires_in": 3600,
                "expires_at": 1700003600,
                "user": {"id": "6f1c1c5e-2b7e-4c1a-9d51-3f0d8a1b2c3d"}
            }"#,
        )
        .unwrap();

        let auth = session.to_auth_config();
        assert_eq!(auth.expires_at, 1_700_003_600);
        assert_eq!(auth.user_id, "6f1c1c5e-2b7e-4c1a-9d51-3f0d8a1b2c3d");
        assert_eq!(auth.email, "");
    }
}
