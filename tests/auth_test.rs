mod common;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use zapnutri::supabase::{ApiError, AuthEvent};
use zapnutri::ZapError;

#[tokio::test]
async fn test_sign_in_stores_session_and_emits_event() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".to_string(),
            "password".to_string(),
        ))
        .match_header("apikey", ANON_KEY)
        .match_body(Matcher::PartialJson(json!({
            "email": "ana@example.com",
            "password": "segredo123"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("access-1", USER_ID))
        .expect(1)
        .create_async()
        .await;

    let client = client(config(&server));
    let mut events = client.on_auth_state_change();

    let session = client
        .sign_in_with_password("ana@example.com", "segredo123")
        .await
        .unwrap();

    token.assert_async().await;
    assert_eq!(session.access_token, "access-1");
    assert!(client.is_authenticated());
    assert_eq!(client.current_user_id().as_deref(), Some(USER_ID));
    assert_eq!(
        events.try_recv().unwrap(),
        AuthEvent::SignedIn {
            user_id: USER_ID.to_string()
        }
    );
}

#[tokio::test]
async fn test_sign_in_with_bad_credentials() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let client = client(config(&server));
    let err = client
        .sign_in_with_password("ana@example.com", "wrong")
        .await
        .unwrap_err();

    match err {
        ZapError::Api(ApiError::AuthenticationFailed(message)) => {
            assert!(message.contains("Invalid login credentials"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_triggers_one_refresh_and_one_replay() {
    let mut server = Server::new_async().await;

    let stale = server
        .mock("GET", "/rest/v1/goals")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer old-token")
        .with_status(401)
        .with_body(r#"{"message":"JWT expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".to_string(),
            "refresh_token".to_string(),
        ))
        .match_body(Matcher::Json(json!({ "refresh_token": "refresh-token" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("new-token", USER_ID))
        .expect(1)
        .create_async()
        .await;
    let replay = server
        .mock("GET", "/rest/v1/goals")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer new-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let client = client(logged_in_config(&server));
    let mut events = client.on_auth_state_change();

    let rows: Vec<serde_json::Value> = client.from("goals").select("*").execute().await.unwrap();

    assert!(rows.is_empty());
    stale.assert_async().await;
    refresh.assert_async().await;
    replay.assert_async().await;
    assert_eq!(client.config().auth.access_token, "new-token");
    assert_eq!(
        events.try_recv().unwrap(),
        AuthEvent::TokenRefreshed {
            user_id: USER_ID.to_string()
        }
    );
}

#[tokio::test]
async fn test_second_unauthorized_is_not_refreshed_again() {
    let mut server = Server::new_async().await;

    let rejected = server
        .mock("GET", "/rest/v1/goals")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"JWT invalid"}"#)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("new-token", USER_ID))
        .expect(1)
        .create_async()
        .await;

    let client = client(logged_in_config(&server));
    let err = client
        .from("goals")
        .execute::<serde_json::Value>()
        .await
        .unwrap_err();

    assert!(matches!(err, ZapError::Api(ApiError::Unauthorized(_))));
    rejected.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_failed_refresh_signs_out() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/rest/v1/goals")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error_description":"Invalid Refresh Token"}"#)
        .create_async()
        .await;

    let client = client(logged_in_config(&server));
    let mut events = client.on_auth_state_change();

    let result = client.from("goals").execute::<serde_json::Value>().await;

    assert!(result.is_err());
    assert!(!client.is_authenticated());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_server_fails() {
    let mut server = Server::new_async().await;
    let logout = server
        .mock("POST", "/auth/v1/logout")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = client(logged_in_config(&server));
    let mut events = client.on_auth_state_change();

    client.sign_out().await.unwrap();

    logout.assert_async().await;
    assert!(!client.is_authenticated());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
}

#[tokio::test]
async fn test_sign_up_pending_confirmation() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .match_body(Matcher::PartialJson(json!({
            "email": "bia@example.com",
            "data": {"nome": "Bia"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": OTHER_USER_ID, "email": "bia@example.com"}).to_string())
        .create_async()
        .await;

    let client = client(config(&server));
    let outcome = client
        .sign_up("bia@example.com", "segredo123", &json!({"nome": "Bia"}))
        .await
        .unwrap();

    assert!(outcome.session.is_none());
    assert_eq!(outcome.user.id.to_string(), OTHER_USER_ID);
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_requests_carry_project_key_and_anon_bearer_when_signed_out() {
    let mut server = Server::new_async().await;
    let templates = server
        .mock("POST", "/rest/v1/rpc/get_food_items_template")
        .match_header("apikey", ANON_KEY)
        .match_header("authorization", format!("Bearer {}", ANON_KEY).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"nome":"Arroz branco","porcao_g":100,"calorias":130}]"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(config(&server));
    let rows: Vec<zapnutri::models::FoodItemTemplate> = client
        .rpc("get_food_items_template", &json!({}))
        .await
        .unwrap();

    templates.assert_async().await;
    assert_eq!(rows[0].nome, "Arroz branco");
}

#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let mut server = Server::new_async().await;

    let mut stale = Vec::new();
    let mut replays = Vec::new();
    for table in ["goals", "body_metrics"] {
        let path = format!("/rest/v1/{}", table);
        stale.push(
            server
                .mock("GET", path.as_str())
                .match_query(Matcher::Any)
                .match_header("authorization", "Bearer old-token")
                .with_status(401)
                .with_body(r#"{"message":"JWT expired"}"#)
                .expect(1)
                .create_async()
                .await,
        );
        replays.push(
            server
                .mock("GET", path.as_str())
                .match_query(Matcher::Any)
                .match_header("authorization", "Bearer new-token")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body("[]")
                .expect(1)
                .create_async()
                .await,
        );
    }
    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".to_string(),
            "refresh_token".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("new-token", USER_ID))
        .expect(1)
        .create_async()
        .await;

    let client = client(logged_in_config(&server));

    let (goals, metrics) = tokio::join!(
        client.from("goals").execute::<serde_json::Value>(),
        client.from("body_metrics").execute::<serde_json::Value>(),
    );

    assert!(goals.unwrap().is_empty());
    assert!(metrics.unwrap().is_empty());
    refresh.assert_async().await;
    for mock in stale.iter().chain(replays.iter()) {
        mock.assert_async().await;
    }
}
