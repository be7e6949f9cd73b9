mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use gabinete_service::models::Role;
use gabinete_service::scheduler::StatusScheduler;
use serde_json::{json, Value};

async fn create_person(app: &TestApp, token: &str, name: &str) -> Value {
    let res = app
        .request(
            Method::POST,
            "/people",
            Some(token),
            Some(json!({ "name": name, "city": "Recife" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.json()
}

#[tokio::test]
async fn test_capabilities_gate_people_crud() {
    let app = TestApp::new().await;
    let (_, visualizador) = app.login_as(Role::Visualizador);
    let (_, assessor) = app.login_as(Role::Assessor);

    let res = app
        .request(Method::POST, "/people", Some(&visualizador), Some(json!({ "name": "Maria" })))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let person = create_person(&app, &assessor, "Maria").await;
    let uri = format!("/people/{}", person["id"].as_str().unwrap());

    assert_eq!(app.get(&uri, Some(&visualizador)).await.status, StatusCode::OK);

    let res = app
        .request(Method::PATCH, &uri, Some(&assessor), Some(json!({ "phone": "81 3333-0000" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["phone"], "81 3333-0000");

    let res = app.request(Method::DELETE, &uri, Some(&assessor), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.request(Method::DELETE, &uri, Some(&app.admin_token()), None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, Some(&assessor)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_requires_capability() {
    let app = TestApp::new().await;
    let (_, visualizador) = app.login_as(Role::Visualizador);
    let (_, chefe) = app.login_as(Role::ChefeGabinete);
    create_person(&app, &chefe, "Silva, João").await;

    let res = app.get("/people/export", Some(&visualizador)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/people/export", Some(&chefe)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers.get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let csv = res.text();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("id,nome,email"));
    assert!(lines.next().unwrap().contains("\"Silva, João\""));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_interaction_lifecycle() {
    let app = TestApp::new().await;
    let (_, assessor) = app.login_as(Role::Assessor);
    let person = create_person(&app, &assessor, "Maria").await;
    let now = Utc::now();

    let res = app
        .request(
            Method::POST,
            "/interactions",
            Some(&assessor),
            Some(json!({
                "person_id": person["id"],
                "subject": "Reunião sobre saneamento",
                "kind": "reuniao",
                "scheduled_start": now + Duration::minutes(30),
                "scheduled_end": now + Duration::minutes(90),
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let interaction = res.json();
    assert_eq!(interaction["status"], "pendente");

    let uri = format!("/interactions/{}", interaction["id"].as_str().unwrap());
    let res = app
        .request(Method::PATCH, &uri, Some(&assessor), Some(json!({ "status": "cancelado" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "cancelado");

    let res = app
        .get(
            &format!("/interactions?person_id={}", person["id"].as_str().unwrap()),
            Some(&assessor),
        )
        .await;
    assert_eq!(res.json()["total"], 1);
}

#[tokio::test]
async fn test_interaction_validation() {
    let app = TestApp::new().await;
    let (_, assessor) = app.login_as(Role::Assessor);
    let person = create_person(&app, &assessor, "Maria").await;
    let now = Utc::now();

    let res = app
        .request(
            Method::POST,
            "/interactions",
            Some(&assessor),
            Some(json!({
                "person_id": person["id"],
                "subject": "Visita",
                "kind": "visita",
                "scheduled_start": now + Duration::hours(2),
                "scheduled_end": now + Duration::hours(1),
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            Method::POST,
            "/interactions",
            Some(&assessor),
            Some(json!({
                "person_id": uuid::Uuid::new_v4(),
                "subject": "Visita",
                "kind": "visita",
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scheduler_advances_statuses_seen_over_http() {
    let app = TestApp::new().await;
    let (_, assessor) = app.login_as(Role::Assessor);
    let person = create_person(&app, &assessor, "Maria").await;
    let now = Utc::now();

    let res = app
        .request(
            Method::POST,
            "/interactions",
            Some(&assessor),
            Some(json!({
                "person_id": person["id"],
                "subject": "Atendimento",
                "kind": "atendimento",
                "scheduled_start": now + Duration::milliseconds(500),
            })),
        )
        .await;
    assert_eq!(res.json()["status"], "pendente");
    let uri = format!("/interactions/{}", res.json()["id"].as_str().unwrap());

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    let scheduler = StatusScheduler::new(app.state.registry.clone(), std::time::Duration::from_secs(60));
    assert_eq!(scheduler.run_once(), 1);
    assert_eq!(scheduler.run_once(), 0);

    assert_eq!(app.get(&uri, Some(&assessor)).await.json()["status"], "em_progresso");
}

#[tokio::test]
async fn test_reports_and_audit_visibility() {
    let app = TestApp::new().await;
    let (_, visualizador) = app.login_as(Role::Visualizador);
    let (_, assessor) = app.login_as(Role::Assessor);
    let (_, chefe) = app.login_as(Role::ChefeGabinete);
    create_person(&app, &assessor, "Maria").await;

    assert_eq!(
        app.get("/reports/summary", Some(&visualizador)).await.status,
        StatusCode::FORBIDDEN
    );
    let res = app.get("/reports/summary", Some(&assessor)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["total_people"], 1);

    app.get("/people/export", Some(&chefe)).await;
    assert_eq!(
        app.get("/audit-logs", Some(&assessor)).await.status,
        StatusCode::FORBIDDEN
    );
    let res = app.get("/audit-logs?limit=5", Some(&chefe)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["entries"][0]["action"], "people.export");
}

#[tokio::test]
async fn test_backup_contains_every_record() {
    let app = TestApp::new().await;
    let admin = app.admin_token();
    create_person(&app, &admin, "Maria").await;

    let res = app.get("/admin/backup", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res
        .headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"gabinete-backup-"));

    let body = res.json();
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["people"].as_array().unwrap().len(), 1);
    assert_eq!(body["maintenance_enabled"], false);
}
