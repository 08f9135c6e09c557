mod common;

use chrono::NaiveDate;
use mockito::{Matcher, Mock, Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use zapnutri::models::{Experiencia, NivelAtividade, Objetivo, OnboardingData, Sexo};
use zapnutri::{OnboardingStep, OnboardingWizard, ZapError};

const ALUNO_ID: &str = "a1";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

fn reviewed_wizard() -> OnboardingWizard {
    let mut wizard = OnboardingWizard::with_data(OnboardingData {
        nome: Some("Ana Souza".to_string()),
        data_nascimento: NaiveDate::from_ymd_opt(1995, 3, 10),
        sexo: Some(Sexo::Feminino),
        altura_cm: Some(165.0),
        peso_kg: Some(68.0),
        objetivo: Some(Objetivo::Emagrecimento),
        nivel_atividade: Some(NivelAtividade::Moderado),
        restricoes_alimentares: vec!["lactose".to_string()],
        alimentos_preferidos: vec!["frango".to_string()],
        refeicoes_por_dia: Some(5),
        experiencia_treino: Some(Experiencia::Iniciante),
        frequencia_treino: Some(3),
        peso_meta_kg: Some(62.0),
    });
    while !wizard.is_review() {
        wizard.advance().unwrap();
    }
    wizard
}

fn mock_write(
    server: &mut ServerGuard,
    method: &str,
    table: &str,
    status: usize,
    body: serde_json::Value,
) -> Mock {
    server
        .mock(method, format!("/rest/v1/{}", table).as_str())
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

fn aluno_row() -> serde_json::Value {
    json!([{ "id": ALUNO_ID, "user_id": USER_ID, "nome": "Ana Souza" }])
}

#[tokio::test]
async fn test_submit_outside_review_is_rejected() {
    let server = Server::new_async().await;
    let app = app(logged_in_config(&server));
    let wizard = OnboardingWizard::new();

    assert_eq!(wizard.step(), OnboardingStep::PersonalInfo);
    let err = wizard
        .submit(&app.client, &app.resolver, today())
        .await
        .unwrap_err();
    assert!(matches!(err, ZapError::Validation(_)));
}

#[tokio::test]
async fn test_failed_goal_write_reports_completed_writes() {
    let mut server = Server::new_async().await;
    let alunos = server
        .mock("POST", "/rest/v1/alunos")
        .match_query(Matcher::UrlEncoded(
            "on_conflict".to_string(),
            "user_id".to_string(),
        ))
        .match_header(
            "prefer",
            "return=representation,resolution=merge-duplicates",
        )
        .match_body(Matcher::PartialJson(json!({ "user_id": USER_ID })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(aluno_row().to_string())
        .expect(1)
        .create_async()
        .await;
    let metrics = server
        .mock("POST", "/rest/v1/body_metrics")
        .match_body(Matcher::PartialJson(json!({
            "aluno_id": ALUNO_ID,
            "peso_kg": 68.0,
            "data": "2024-05-20"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": "m1" }]).to_string())
        .expect(1)
        .create_async()
        .await;
    let goals = mock_write(
        &mut server,
        "POST",
        "goals",
        500,
        json!({ "message": "boom" }),
    )
    .expect(1)
    .create_async()
    .await;
    let preferences = mock_write(
        &mut server,
        "POST",
        "preferencias_alimentares",
        201,
        json!([]),
    )
    .expect(0)
    .create_async()
    .await;

    let app = app(logged_in_config(&server));
    let err = reviewed_wizard()
        .submit(&app.client, &app.resolver, today())
        .await
        .unwrap_err();

    match err {
        ZapError::Onboarding {
            step, completed, ..
        } => {
            assert_eq!(step, "goals");
            assert_eq!(completed, vec!["alunos", "body_metrics"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    alunos.assert_async().await;
    metrics.assert_async().await;
    goals.assert_async().await;
    preferences.assert_async().await;
}

#[tokio::test]
async fn test_successful_submit_remembers_aluno_id() {
    let mut server = Server::new_async().await;
    mock_write(&mut server, "POST", "alunos", 201, aluno_row())
        .create_async()
        .await;
    mock_write(&mut server, "POST", "body_metrics", 201, json!([{ "id": "m1" }]))
        .create_async()
        .await;
    mock_write(&mut server, "POST", "goals", 201, json!([{ "id": "g1" }]))
        .create_async()
        .await;
    let preferences = server
        .mock("POST", "/rest/v1/preferencias_alimentares")
        .match_query(Matcher::UrlEncoded(
            "on_conflict".to_string(),
            "aluno_id".to_string(),
        ))
        .match_body(Matcher::PartialJson(json!({
            "aluno_id": ALUNO_ID,
            "refeicoes_por_dia": 5
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "aluno_id": ALUNO_ID }]).to_string())
        .expect(1)
        .create_async()
        .await;
    let lookup = server
        .mock("GET", "/rest/v1/alunos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = app(logged_in_config(&server));
    let aluno_id = reviewed_wizard()
        .submit(&app.client, &app.resolver, today())
        .await
        .unwrap();

    assert_eq!(aluno_id, ALUNO_ID);
    assert_eq!(app.resolver.get_aluno_id().await.unwrap(), ALUNO_ID);

    preferences.assert_async().await;
    lookup.assert_async().await;
}
