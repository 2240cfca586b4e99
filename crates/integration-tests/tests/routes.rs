//! End-to-end requests through the dashboard router.
//!
//! Uses the in-memory store, the fake auth provider and in-memory sessions,
//! so no database or network is needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceExt;

use chronify_core::PartNumber;
use chronify_dashboard::db::InventoryStore;
use chronify_dashboard::models::FieldUpdate;
use chronify_integration_tests::{
    FakeAuthProvider, MemoryStore, body_text, get, location, part, post_form, session_cookie,
    test_app,
};

fn dev_app(store: &Arc<MemoryStore>) -> Router {
    test_app(Arc::clone(store), Arc::new(FakeAuthProvider::new()), true)
}

#[tokio::test]
async fn test_health_endpoints() {
    let store = Arc::new(MemoryStore::new());
    let app = dev_app(&store);

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.clone().oneshot(get("/health/ready", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    store.fail_reads();
    let response = app.oneshot(get("/health/ready", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pages_redirect_to_login_without_session() {
    let app = test_app(
        Arc::new(MemoryStore::new()),
        Arc::new(FakeAuthProvider::new()),
        false,
    );

    for path in ["/", "/inventory", "/inventory/manage", "/history", "/parts/new"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/auth/login"), "{path}");
    }

    let response = app.oneshot(get("/auth/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dev_mode_serves_home_without_login() {
    let store = Arc::new(MemoryStore::with_parts([
        part("A", 2, 500),
        part("B", 0, 10_000),
        part("C", 3, 100),
        part("D", 10, 100),
    ]));
    let app = dev_app(&store);

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Logged in as: test@test.com"));
    assert!(body.contains("offline / dev"));
    assert!(body.contains(r#"<div class="metric-value">4</div>"#));
    assert!(body.contains(r#"<div class="metric-value">$23.00</div>"#));
    assert!(body.contains(r#"<div class="metric-value">2</div>"#));
}

#[tokio::test]
async fn test_login_sets_session_and_logout_clears_it() {
    let auth = Arc::new(FakeAuthProvider::new().with_account("jane@chronify.test", "pw-123"));
    let store = Arc::new(MemoryStore::new());
    let app = test_app(Arc::clone(&store), auth, false);

    let response = app
        .clone()
        .oneshot(post_form(
            "/auth/login",
            &[("email", "jane@chronify.test"), ("password", "pw-123")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let cookie = session_cookie(&response).unwrap();

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Logged in as: jane@chronify.test"));
    assert!(body.contains("Profile created on login."));
    assert_eq!(store.profiles().len(), 1);

    let response = app
        .clone()
        .oneshot(post_form("/auth/logout", &[], Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), Some("/auth/login"));

    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_failed_login_re_renders_form() {
    let auth = Arc::new(FakeAuthProvider::new().with_account("jane@chronify.test", "pw-123"));
    let app = test_app(Arc::new(MemoryStore::new()), auth, false);

    let response = app
        .oneshot(post_form(
            "/auth/login",
            &[("email", "jane@chronify.test"), ("password", "nope")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Login failed: invalid email or password."));
    assert!(body.contains(r#"value="jane@chronify.test""#));
}

#[tokio::test]
async fn test_manage_save_updates_store_and_history() {
    let store = Arc::new(MemoryStore::with_parts([part("A", 5, 100), part("B", 1, 100)]));
    let app = dev_app(&store);

    let response = app
        .oneshot(post_form(
            "/inventory/manage",
            &[
                ("sort", "stock_qnt"),
                ("order", "desc"),
                ("part_number", "A"),
                ("orig_description", "A description"),
                ("orig_category", "Panels"),
                ("orig_stock_qnt", "5"),
                ("description", "A description"),
                ("category", "Panels"),
                ("stock_qnt", "7"),
                ("part_number", "B"),
                ("orig_description", "B description"),
                ("orig_category", "Panels"),
                ("orig_stock_qnt", "1"),
                ("description", "B description"),
                ("category", "Panels"),
                ("stock_qnt", "1"),
                ("part_number", ""),
                ("description", ""),
                ("category", ""),
                ("stock_qnt", ""),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("1 change(s) logged to Stock History."));
    assert!(body.contains("Saved 1 of 1 update(s)."));

    assert_eq!(store.part("A").unwrap().stock_qnt, 7);
    assert_eq!(store.part("B").unwrap().stock_qnt, 1);
    let history = store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user, "test@test.com");
}

#[tokio::test]
async fn test_manage_save_leaves_untouched_rows_alone() {
    let store = Arc::new(MemoryStore::with_parts([part("A", 5, 100), part("B", 1, 100)]));
    let app = dev_app(&store);

    let page = body_text(app.clone().oneshot(get("/inventory/manage", None)).await.unwrap()).await;
    assert!(page.contains(r#"name="orig_stock_qnt" value="1""#));

    // Someone else restocks B after the page was rendered.
    let b = PartNumber::parse("B").unwrap();
    store.update_part_field(&b, &FieldUpdate::StockQnt(9)).await.unwrap();

    let response = app
        .oneshot(post_form(
            "/inventory/manage",
            &[
                ("part_number", "A"),
                ("orig_description", "A description"),
                ("orig_category", "Panels"),
                ("orig_stock_qnt", "5"),
                ("description", "A description"),
                ("category", "Panels"),
                ("stock_qnt", "7"),
                ("part_number", "B"),
                ("orig_description", "B description"),
                ("orig_category", "Panels"),
                ("orig_stock_qnt", "1"),
                ("description", "B description"),
                ("category", "Panels"),
                ("stock_qnt", "1"),
            ],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(store.part("A").unwrap().stock_qnt, 7);
    assert_eq!(store.part("B").unwrap().stock_qnt, 9);
    let history: Vec<(String, i32)> = store
        .history()
        .into_iter()
        .map(|h| (h.part_number.to_string(), h.stock_qnt))
        .collect();
    assert_eq!(history, vec![("A".to_string(), 7)]);
}

#[tokio::test]
async fn test_manage_rejects_unknown_sort_column() {
    let store = Arc::new(MemoryStore::new());
    let app = dev_app(&store);

    let response = app
        .oneshot(get("/inventory/manage?sort=price&order=asc", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_part_flow() {
    let store = Arc::new(MemoryStore::with_parts([part("A", 5, 100)]));
    let app = dev_app(&store);

    let response = app
        .clone()
        .oneshot(post_form(
            "/parts",
            &[
                ("part_number", "NEW-1"),
                ("description", "Shelf"),
                ("stock_qnt", "4"),
                ("sheet_price", "10.005"),
                ("multiplier", "1"),
                ("status", "Active"),
            ],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/parts/new"));
    let cookie = session_cookie(&response).unwrap();

    let added = store.part("NEW-1").unwrap();
    assert_eq!(added.price.to_string(), "10.01");
    assert_eq!(added.user, "test@test.com");

    let response = app.clone().oneshot(get("/parts/new", Some(&cookie))).await.unwrap();
    assert!(body_text(response).await.contains("Part NEW-1 added successfully."));

    let response = app
        .oneshot(post_form("/parts", &[("part_number", "A")], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Part number already exists."));
    assert_eq!(store.insert_attempts(), 1);
}

#[tokio::test]
async fn test_add_part_rejects_price_too_large() {
    let store = Arc::new(MemoryStore::new());
    let app = dev_app(&store);

    let response = app
        .oneshot(post_form(
            "/parts",
            &[
                ("part_number", "BIG-1"),
                ("sheet_price", "79228162514264337593543950335"),
                ("multiplier", "2"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Sheet price times multiplier is too large."));
    assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn test_home_survives_stock_value_overflow() {
    let mut huge = part("A", 2, 100);
    huge.price = rust_decimal::Decimal::MAX;
    let store = Arc::new(MemoryStore::with_parts([huge, part("B", 1, 100)]));
    let app = dev_app(&store);

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Total stock value is too large to compute"));
    assert!(body.contains("out of range"));
    assert!(body.contains(r#"<div class="metric-value">2</div>"#));
}

#[tokio::test]
async fn test_empty_pages_show_notices() {
    let store = Arc::new(MemoryStore::new());
    let app = dev_app(&store);

    let body = body_text(app.clone().oneshot(get("/inventory", None)).await.unwrap()).await;
    assert!(body.contains("No parts found in the inventory."));

    let body = body_text(app.clone().oneshot(get("/history", None)).await.unwrap()).await;
    assert!(body.contains("No stock changes have been logged yet."));

    let response = app.oneshot(get("/no-such-page", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
