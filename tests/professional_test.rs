mod common;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use zapnutri::models::InstructionKind;
use zapnutri::ZapError;

const STUDENT_ALUNO_ID: &str = "s9";

fn mock_roster(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/rest/v1/vw_alunos_profissional")
        .match_query(Matcher::AllOf(vec![
            eq("profissional_id", USER_ID),
            Matcher::UrlEncoded("order".to_string(), "nome.asc".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([{
                "aluno_id": STUDENT_ALUNO_ID,
                "profissional_id": USER_ID,
                "nome": "Bruno Lima"
            }])
            .to_string(),
        )
}

#[tokio::test]
async fn test_student_cannot_impersonate() {
    let mut server = Server::new_async().await;
    mock_role(&mut server, USER_ID, "aluno").create_async().await;
    let roster = mock_roster(&mut server).expect(0).create_async().await;

    let app = app(logged_in_config(&server));
    let err = app
        .professional()
        .start_impersonation(STUDENT_ALUNO_ID)
        .await
        .unwrap_err();

    assert!(matches!(err, ZapError::Forbidden(_)));
    assert!(!app.resolver.impersonation().is_active().unwrap());
    roster.assert_async().await;
}

#[tokio::test]
async fn test_professional_impersonates_student_on_roster() {
    let mut server = Server::new_async().await;
    mock_role(&mut server, USER_ID, "profissional").create_async().await;
    mock_roster(&mut server).create_async().await;

    let app = app(logged_in_config(&server));
    let professional = app.professional();

    let state = professional
        .start_impersonation(STUDENT_ALUNO_ID)
        .await
        .unwrap();
    assert!(state.is_usable());
    assert_eq!(state.professional_user_id.as_deref(), Some(USER_ID));

    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), STUDENT_ALUNO_ID);
    assert!(professional.impersonation_status().unwrap().is_some());

    assert!(professional.stop_impersonation().unwrap());
    assert!(professional.impersonation_status().unwrap().is_none());
}

#[tokio::test]
async fn test_student_outside_roster_is_forbidden() {
    let mut server = Server::new_async().await;
    mock_role(&mut server, USER_ID, "profissional").create_async().await;
    mock_roster(&mut server).create_async().await;

    let app = app(logged_in_config(&server));
    let err = app
        .professional()
        .start_impersonation("someone-else")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapError::Forbidden(_)));
}

#[tokio::test]
async fn test_blank_instructions_are_not_saved() {
    let mut server = Server::new_async().await;
    let upsert = server
        .mock("POST", "/rest/v1/instrucoes_nutricionista")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = app(logged_in_config(&server));
    let err = app
        .professional()
        .save_instructions(InstructionKind::Nutricionista, STUDENT_ALUNO_ID, "  \n")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapError::Validation(_)));
    upsert.assert_async().await;
}
