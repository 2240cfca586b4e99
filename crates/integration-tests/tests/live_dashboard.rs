//! Smoke tests against a running dashboard.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`chronify migrate`)
//! - The dashboard running with `CHRONIFY_DEV_MODE=true`
//!   (`cargo run -p chronify-dashboard`)
//!
//! Run with: `CHRONIFY_TEST_URL=http://localhost:3001 cargo test -p chronify-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};

fn base_url() -> String {
    std::env::var("CHRONIFY_TEST_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires a running dashboard"]
async fn test_live_readiness() {
    let resp = client()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running dashboard in dev mode"]
async fn test_live_pages_render() {
    let client = client();
    for path in ["/", "/inventory", "/inventory/manage", "/history", "/parts/new"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body = resp.text().await.unwrap();
        assert!(body.contains("Chronify"), "{path}");
    }
}
