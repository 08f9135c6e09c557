//! Thin typed client for a Supabase project: GoTrue auth, PostgREST tables,
//! views and RPCs, and Edge Functions.

use parking_lot::Mutex;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{Result, ZapError};

mod auth;
mod error;
mod query;
mod retry;

pub use auth::{AuthEvent, AuthUser, Session, SignUpOutcome};
pub use error::ApiError;
pub use query::QueryBuilder;
pub use retry::RetryConfig;

/// API client for a ZapNutri Supabase project
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    config: Arc<Mutex<Config>>,
    retry_config: RetryConfig,
    events: broadcast::Sender<AuthEvent>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(config: Config) -> Result<Self> {
        Self::with_retry_config(config, RetryConfig::default())
    }

    /// Create a new client with custom retry configuration
    pub fn with_retry_config(config: Config, retry_config: RetryConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.supabase.timeout_seconds);
        let base_url = config.supabase.url.trim_end_matches('/').to_string();
        let anon_key = config.supabase.anon_key.clone();

        Url::parse(&base_url)
            .map_err(|e| ZapError::Config(format!("Invalid Supabase URL {}: {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ZapError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let (events, _) = broadcast::channel(16);

        Ok(Self {
            http,
            base_url,
            anon_key,
            config: Arc::new(Mutex::new(config)),
            retry_config,
            events,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Project identifier used to namespace local storage keys:
    /// `abc` for `https://abc.supabase.co`, `host:port` otherwise
    pub fn project_ref(&self) -> String {
        let Ok(url) = Url::parse(&self.base_url) else {
            return self.base_url.clone();
        };
        let host = url.host_str().unwrap_or_default();

        if let Some(project) = host.strip_suffix(".supabase.co") {
            return project.to_string();
        }

        match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Snapshot of the current configuration (including session)
    pub fn config(&self) -> Config {
        self.config.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.lock().is_authenticated()
    }

    /// Auth user id of the current session
    pub fn current_user_id(&self) -> Option<String> {
        let config = self.config.lock();
        if config.is_authenticated() && !config.auth.user_id.is_empty() {
            Some(config.auth.user_id.clone())
        } else {
            None
        }
    }

    /// Auth user id of the current session, or `NotAuthenticated`
    pub fn require_user_id(&self) -> Result<String> {
        self.current_user_id().ok_or(ZapError::NotAuthenticated)
    }

    /// Subscribe to sign-in / sign-out / refresh events
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        tracing::debug!("Auth state change: {:?}", event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub(crate) fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub(crate) fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn functions_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Bearer token: the session's access token, or the anon key
    fn bearer(&self) -> String {
        let config = self.config.lock();
        if config.is_authenticated() {
            config.auth.access_token.clone()
        } else {
            self.anon_key.clone()
        }
    }

    fn has_refresh_token(&self) -> bool {
        !self.config.lock().auth.refresh_token.is_empty()
    }

    /// Base request with project key and bearer token
    pub(crate) fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send a request built by `build`. A 401 on an authenticated session
    /// triggers one token refresh and one replay.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.bearer();
        let response = build(&token).send().await.map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED && self.has_refresh_token() {
            tracing::debug!("Received 401, attempting token refresh");

            let fresh_token = self.refresh_once(&token).await?;

            let response = build(&fresh_token)
                .send()
                .await
                .map_err(ApiError::from)?;
            return Ok(response);
        }

        Ok(response)
    }

    /// Refresh unless a concurrent request already replaced `stale_token`.
    /// Concurrent 401s share a single refresh-token exchange.
    async fn refresh_once(&self, stale_token: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.bearer();
        if current != stale_token && self.is_authenticated() {
            tracing::debug!("Access token already refreshed");
            return Ok(current);
        }

        Ok(self.refresh_session().await?.access_token)
    }

    /// Call a Postgres function through PostgREST. Retried on transient
    /// failures, so only use it for read-only functions.
    pub async fn rpc<A, T>(&self, name: &str, args: &A) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.rest_url(&format!("rpc/{}", name));
        tracing::debug!("Calling RPC {}", name);

        self.retry_config
            .execute(|| async {
                let response = self
                    .send(|token| self.request(Method::POST, &url, token).json(args))
                    .await?;
                decode(response).await
            })
            .await
    }

    /// Invoke an Edge Function with a JSON body
    pub async fn invoke<B, T>(&self, name: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.functions_url(name);
        tracing::debug!("Invoking edge function {}", name);

        let response = self
            .send(|token| self.request(Method::POST, &url, token).json(body))
            .await?;
        let result = decode(response).await?;

        tracing::info!("Edge function {} completed", name);
        Ok(result)
    }

    /// Start a table or view query
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table)
    }
}

/// Decode a JSON response, turning non-2xx statuses into `ApiError`s
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::from_response(response).await.into());
    }

    let body = response.text().await.map_err(ApiError::from)?;
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };

    serde_json::from_str(body).map_err(|e| {
        ZapError::Serialization(format!("Failed to parse response ({}): {}", status, e))
    })
}

/// Fail on non-2xx statuses, discarding the body otherwise
pub(crate) async fn check(response: Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ApiError::from_response(response).await.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SupabaseClient::new(Config::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = Config::for_project("not a url", "anon");
        assert!(matches!(
            SupabaseClient::new(config),
            Err(ZapError::Config(_))
        ));
    }

    #[test]
    fn test_project_ref() {
        let client =
            SupabaseClient::new(Config::for_project("https://xyzcompany.supabase.co/", "anon"))
                .unwrap();
        assert_eq!(client.project_ref(), "xyzcompany");
        assert_eq!(client.base_url(), "https://xyzcompany.supabase.co");

        let local = SupabaseClient::new(Config::default()).unwrap();
        assert_eq!(local.project_ref(), "localhost:54321");
    }

    #[test]
    fn test_urls() {
        let client =
            SupabaseClient::new(Config::for_project("https://abc.supabase.co", "anon")).unwrap();
        assert_eq!(
            client.rest_url("rpc/get_aluno_chart_data"),
            "https://abc.supabase.co/rest/v1/rpc/get_aluno_chart_data"
        );
        assert_eq!(client.auth_url("user"), "https://abc.supabase.co/auth/v1/user");
        assert_eq!(
            client.functions_url("chat-nutricionista"),
            "https://abc.supabase.co/functions/v1/chat-nutricionista"
        );
    }

    #[test]
    fn test_unauthenticated_user_id() {
        let client = SupabaseClient::new(Config::default()).unwrap();
        assert!(client.current_user_id().is_none());
        assert!(matches!(
            client.require_user_id(),
            Err(ZapError::NotAuthenticated)
        ));
    }
}
