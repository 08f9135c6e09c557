mod common;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;

use common::*;
use zapnutri::models::UserRole;
use zapnutri::ZapError;

const ALUNO_ID: &str = "a1";
const STUDENT_ALUNO_ID: &str = "s9";

#[tokio::test]
async fn test_repeated_lookup_is_served_from_cache() {
    let mut server = Server::new_async().await;
    let lookup = mock_aluno_lookup(&mut server, USER_ID, ALUNO_ID)
        .expect(1)
        .create_async()
        .await;

    let app = app(logged_in_config(&server));

    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);
    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);

    lookup.assert_async().await;
}

#[tokio::test]
async fn test_sign_out_invalidates_cache() {
    let mut server = Server::new_async().await;
    let lookup = mock_aluno_lookup(&mut server, USER_ID, ALUNO_ID)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("POST", "/auth/v1/logout")
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("second-token", USER_ID))
        .create_async()
        .await;

    let app = app(logged_in_config(&server));
    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);

    app.client.sign_out().await.unwrap();
    assert!(matches!(
        app.resolver.get_aluno_id().await,
        Err(ZapError::NotAuthenticated)
    ));

    app.client
        .sign_in_with_password("ana@example.com", "segredo123")
        .await
        .unwrap();
    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);

    lookup.assert_async().await;
}

#[tokio::test]
async fn test_impersonation_takes_precedence() {
    let mut server = Server::new_async().await;
    let lookup = mock_aluno_lookup(&mut server, USER_ID, ALUNO_ID)
        .expect(1)
        .create_async()
        .await;

    let app = app(logged_in_config(&server));
    app.resolver
        .impersonation()
        .start(USER_ID, STUDENT_ALUNO_ID, UserRole::Profissional)
        .unwrap();

    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), STUDENT_ALUNO_ID);
    assert!(app.resolver.impersonation().is_active().unwrap());

    assert!(app.resolver.impersonation().stop().unwrap());
    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);

    lookup.assert_async().await;
}

#[tokio::test]
async fn test_missing_aluno_row_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/alunos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let app = app(logged_in_config(&server));

    assert!(matches!(
        app.resolver.get_aluno_id().await,
        Err(ZapError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_remember_skips_lookup() {
    let mut server = Server::new_async().await;
    let lookup = mock_aluno_lookup(&mut server, USER_ID, ALUNO_ID)
        .expect(0)
        .create_async()
        .await;

    let app = app(logged_in_config(&server));
    app.resolver.remember("a7").unwrap();

    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), "a7");
    assert_eq!(app.resolver.invalidate().unwrap(), 1);

    lookup.assert_async().await;
}
