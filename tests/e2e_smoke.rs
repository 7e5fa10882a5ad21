// tests/e2e_smoke.rs
//
// Boot the app the way the binary does (config file + seed snapshot), then
// drive the router and the sync worker against a mocked upstream.

use std::path::{Path, PathBuf};

use serde_json::json;
use shuttle_axum::axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt; // for `oneshot` (tower 0.5 with features=["util"])
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spaceflight_news_api::model::ResourceKind;
use spaceflight_news_api::{build_app, AppConfig, CacheKey, SyncOutcome};

fn local_config(ll_url: &str) -> AppConfig {
    let mut cfg =
        AppConfig::from_file(Path::new("config/snapi.toml")).expect("load config/snapi.toml");
    cfg.ll_url = ll_url.to_string();
    cfg.ll_token = Some("smoke-token".into());
    cfg.seed_path = Some(PathBuf::from("data/seed.json"));
    cfg.validate().expect("valid config");
    cfg
}

#[tokio::test]
async fn smoke_seeded_lookup_and_sync() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launch"))
        .and(header("authorization", "Token smoke-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": "e3df2ecd-c239-472f-95e4-2b89b4f75800",
                "name": "Falcon 9 Block 5 | Starlink Group 2-1",
                "net": "2021-09-14T03:55:50Z",
                "status": { "name": "Launch Successful" },
                "launch_service_provider": { "name": "SpaceX" }
            }]
        })))
        .mount(&server)
        .await;

    let app = build_app(&local_config(&server.uri())).expect("build app");

    let req = Request::builder()
        .uri("/articles/launch/falcon-9-b1051")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let s = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(s.contains("\"provider\":\"Launch Library 2\""));
    assert!(app.cache.get(&CacheKey::launch("falcon-9-b1051")).await.is_some());

    let report = app.worker.sync_all(ResourceKind::Launch).await;
    assert_eq!(report.outcome, SyncOutcome::Completed);
    assert_eq!(report.inserted, 1);
    assert_eq!(
        app.store
            .launch("e3df2ecd-c239-472f-95e4-2b89b4f75800")
            .and_then(|l| l.status),
        Some("Launch Successful".to_string())
    );
}

#[tokio::test]
async fn smoke_reports_from_seed() {
    let app = build_app(&local_config("http://127.0.0.1:9")).expect("build app");

    let req = Request::builder()
        .uri("/reports?newsSite=NASA")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v.as_array().map(Vec::len), Some(1));
    assert_eq!(v[0]["id"], "607f1f77bcf86cd799439021");
}
