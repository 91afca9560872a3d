//! Static asset and SPA fallback serving.

mod common;

use axum::http::StatusCode;
use common::{body_string, context, get};
use mc_axum::{ServerConfig, create_app};
use mc_relay::testing::ScriptedConnector;
use tower::ServiceExt;

fn site() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let dist = root.path().join("dist");
    let public = root.path().join("public");
    std::fs::create_dir_all(dist.join("assets")).unwrap();
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(dist.join("index.html"), "<div id=\"root\"></div>").unwrap();
    std::fs::write(dist.join("assets/app.js"), "console.log(1)").unwrap();
    std::fs::write(public.join("concept.txt"), "concept art").unwrap();
    root
}

fn config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        public_dir: Some(root.join("public")),
        ..ServerConfig::default().with_static_dir(root.join("dist"))
    }
}

#[tokio::test]
async fn serves_built_assets() {
    let root = site();
    let app = create_app(context(ScriptedConnector::pending(), root.path()), &config(root.path()));

    let response = app.oneshot(get("/assets/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "console.log(1)");
}

#[tokio::test]
async fn client_routes_fall_back_to_index() {
    let root = site();
    let app = create_app(context(ScriptedConnector::pending(), root.path()), &config(root.path()));

    let response = app.oneshot(get("/agents/scout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<div id=\"root\"></div>");
}

#[tokio::test]
async fn public_dir_is_mounted() {
    let root = site();
    let app = create_app(context(ScriptedConnector::pending(), root.path()), &config(root.path()));

    let response = app.oneshot(get("/public/concept.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "concept art");
}

#[tokio::test]
async fn api_routes_win_over_fallback() {
    let root = site();
    let app = create_app(context(ScriptedConnector::pending(), root.path()), &config(root.path()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn unknown_api_path_is_not_the_spa() {
    let root = site();
    let app = create_app(context(ScriptedConnector::pending(), root.path()), &config(root.path()));

    let response = app.oneshot(get("/api/unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
