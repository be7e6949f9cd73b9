mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use gabinete_service::maintenance::{KeyValueStore, MemoryStore, MAINTENANCE_KEY};
use gabinete_service::models::Role;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn enable(app: &TestApp, token: &str) {
    let res = app
        .request(
            Method::PUT,
            "/maintenance",
            Some(token),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["enabled"], true);
    assert_eq!(body["blocked"], false);
    assert_eq!(body["persisted"], true);
}

#[tokio::test]
async fn test_maintenance_blocks_everyone_but_admins() {
    let app = TestApp::new().await;
    let admin = app.admin_token();
    let (_, assessor) = app.login_as(Role::Assessor);

    assert_eq!(app.get("/people", Some(&assessor)).await.status, StatusCode::OK);

    enable(&app, &admin).await;

    let res = app.get("/people", Some(&assessor)).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json()["maintenance"], true);

    assert_eq!(app.get("/people", Some(&admin)).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/dashboard", None).await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_exempt_routes_stay_reachable() {
    let app = TestApp::new().await;
    let (_, assessor) = app.login_as(Role::Assessor);
    enable(&app, &app.admin_token()).await;

    assert_eq!(app.get("/health", None).await.status, StatusCode::OK);
    assert_eq!(app.get("/login", None).await.status, StatusCode::OK);

    let res = app.get("/maintenance", Some(&assessor)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "enabled": true, "blocked": true }));

    let res = app.get("/me", Some(&assessor)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["blocked"], true);
}

#[tokio::test]
async fn test_only_admins_toggle_maintenance() {
    let app = TestApp::new().await;
    let (_, chefe) = app.login_as(Role::ChefeGabinete);

    let res = app
        .request(
            Method::PUT,
            "/maintenance",
            Some(&chefe),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/dashboard"));
    assert!(!app.state.maintenance.is_enabled());
}

#[tokio::test]
async fn test_disabling_unblocks() {
    let app = TestApp::new().await;
    let admin = app.admin_token();
    let (_, visualizador) = app.login_as(Role::Visualizador);

    enable(&app, &admin).await;
    let res = app
        .request(
            Method::PUT,
            "/maintenance",
            Some(&admin),
            Some(json!({ "enabled": false })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    assert_eq!(
        app.get("/people", Some(&visualizador)).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.storage.get(MAINTENANCE_KEY).await.unwrap().as_deref(),
        Some("false")
    );
}

#[tokio::test]
async fn test_flag_survives_restart() {
    let storage = MemoryStore::new();
    let first = TestApp::with_storage(storage.clone()).await;
    enable(&first, &first.admin_token()).await;

    let restarted = TestApp::with_storage(storage).await;
    assert!(restarted.state.maintenance.is_enabled());
}

#[tokio::test]
async fn test_change_reaches_other_instances() {
    let storage = MemoryStore::new();
    let first = TestApp::with_storage(storage.clone()).await;
    let second = TestApp::with_storage(storage).await;
    let (_, assessor) = second.login_as(Role::Assessor);

    let cancel = CancellationToken::new();
    let sync = second.state.maintenance.clone().spawn_sync(cancel.clone());
    let mut changes = second.state.maintenance.subscribe();

    enable(&first, &first.admin_token()).await;

    tokio::time::timeout(Duration::from_secs(1), changes.changed())
        .await
        .expect("second instance was not notified")
        .unwrap();
    assert_eq!(
        second.get("/people", Some(&assessor)).await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );

    cancel.cancel();
    sync.await.unwrap();
}

#[tokio::test]
async fn test_toggle_is_audited() {
    let app = TestApp::new().await;
    let admin = app.admin_token();
    enable(&app, &admin).await;

    let res = app.get("/audit-logs", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["entries"][0]["action"], "maintenance.enable");
}
