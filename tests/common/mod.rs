#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::sync::Arc;

use zapnutri::config::AuthConfig;
use zapnutri::{Config, RetryConfig, Storage, SupabaseClient, ZapNutri};

pub const USER_ID: &str = "6f1c1c5e-2b7e-4c1a-9d51-3f0d8a1b2c3d";
pub const OTHER_USER_ID: &str = "0b7f7f5a-1111-4c1a-9d51-aaaaaaaaaaaa";
pub const ANON_KEY: &str = "anon-key";

pub fn config(server: &ServerGuard) -> Config {
    Config::for_project(server.url(), ANON_KEY)
}

/// In-memory config with a live session for `USER_ID`
pub fn logged_in_config(server: &ServerGuard) -> Config {
    let mut config = config(server);
    config.set_session(AuthConfig {
        access_token: "old-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        user_id: USER_ID.to_string(),
        email: "ana@example.com".to_string(),
        expires_at: 0,
    });
    config
}

pub fn client(config: Config) -> Arc<SupabaseClient> {
    Arc::new(SupabaseClient::with_retry_config(config, RetryConfig::none()).unwrap())
}

pub fn app(config: Config) -> ZapNutri {
    ZapNutri::with_retry_config(config, Storage::temporary().unwrap(), RetryConfig::none())
        .unwrap()
}

pub fn session_body(access_token: &str, user_id: &str) -> String {
    json!({
        "access_token": access_token,
        "refresh_token": format!("{}-refresh", access_token),
        "token_type": "bearer",
        "expires_in": 3600,
        "user": {"id": user_id, "email": "ana@example.com"}
    })
    .to_string()
}

pub fn eq(column: &str, value: &str) -> Matcher {
    Matcher::UrlEncoded(column.to_string(), format!("eq.{}", value))
}

/// `GET /rest/v1/alunos?select=id&user_id=eq.<user>` answering with `aluno_id`.
/// Not yet registered: finish with `create_async`.
pub fn mock_aluno_lookup(server: &mut ServerGuard, user_id: &str, aluno_id: &str) -> Mock {
    server
        .mock("GET", "/rest/v1/alunos")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".to_string(), "id".to_string()),
            eq("user_id", user_id),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": aluno_id }]).to_string())
}

/// `GET /rest/v1/profiles?select=role&id=eq.<user>`, not yet registered
pub fn mock_role(server: &mut ServerGuard, user_id: &str, role: &str) -> Mock {
    server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".to_string(), "role".to_string()),
            eq("id", user_id),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "role": role }]).to_string())
}
