//! Integration test support for Chronify.
//!
//! The dashboard talks to its database and auth provider through the
//! [`InventoryStore`] and [`AuthProvider`] traits. This crate provides
//! in-memory implementations of both, with failure injection, and builds the
//! full router around them so tests can drive real requests without
//! `PostgreSQL` or network access.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests
//! cargo test -p chronify-integration-tests
//!
//! # Tests against a running dashboard (needs CHRONIFY_TEST_URL)
//! cargo test -p chronify-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use uuid::Uuid;

use chronify_core::{Email, PartNumber, PartStatus};
use chronify_dashboard::config::{AuthProviderConfig, DashboardConfig};
use chronify_dashboard::db::{InventoryStore, RepositoryError};
use chronify_dashboard::middleware::{SESSION_COOKIE_NAME, configure_session_layer};
use chronify_dashboard::models::{
    FieldUpdate, NewPart, NewStockHistoryEntry, Part, StockHistoryEntry, TrackedColumn, UserProfile,
};
use chronify_dashboard::services::auth::{AuthUser, SignUpRequest};
use chronify_dashboard::services::{AuthError, AuthProvider};
use chronify_dashboard::state::AppState;

// =============================================================================
// In-memory store
// =============================================================================

/// `InventoryStore` over plain collections.
///
/// Failures are injected per `(part, column)` update, for the stock history
/// insert, and for reads.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreData>,
}

#[derive(Default)]
struct StoreData {
    parts: BTreeMap<PartNumber, Part>,
    history: Vec<StockHistoryEntry>,
    profiles: Vec<UserProfile>,
    failing_updates: HashSet<(PartNumber, TrackedColumn)>,
    fail_history_insert: bool,
    fail_reads: bool,
    insert_attempts: usize,
}

fn injected_failure() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `parts`.
    #[must_use]
    pub fn with_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        let store = Self::new();
        {
            let mut data = store.data();
            for part in parts {
                data.parts.insert(part.part_number.clone(), part);
            }
        }
        store
    }

    fn data(&self) -> MutexGuard<'_, StoreData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make updates of `column` on `part_number` fail.
    pub fn fail_update(&self, part_number: &str, column: TrackedColumn) {
        let pn = PartNumber::parse(part_number).unwrap();
        self.data().failing_updates.insert((pn, column));
    }

    /// Make the stock history insert fail.
    pub fn fail_history_insert(&self) {
        self.data().fail_history_insert = true;
    }

    /// Make every read fail.
    pub fn fail_reads(&self) {
        self.data().fail_reads = true;
    }

    /// Current parts, ordered by part number.
    #[must_use]
    pub fn parts(&self) -> Vec<Part> {
        self.data().parts.values().cloned().collect()
    }

    #[must_use]
    pub fn part(&self, part_number: &str) -> Option<Part> {
        let pn = PartNumber::parse(part_number).ok()?;
        self.data().parts.get(&pn).cloned()
    }

    /// History entries in insertion order.
    #[must_use]
    pub fn history(&self) -> Vec<StockHistoryEntry> {
        self.data().history.clone()
    }

    #[must_use]
    pub fn profiles(&self) -> Vec<UserProfile> {
        self.data().profiles.clone()
    }

    /// How many times `insert_part` was called.
    #[must_use]
    pub fn insert_attempts(&self) -> usize {
        self.data().insert_attempts
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        if self.data().fail_reads {
            return Err(injected_failure());
        }
        Ok(())
    }

    async fn list_parts(&self) -> Result<Vec<Part>, RepositoryError> {
        let data = self.data();
        if data.fail_reads {
            return Err(injected_failure());
        }
        Ok(data.parts.values().cloned().collect())
    }

    async fn part_exists(&self, part_number: &PartNumber) -> Result<bool, RepositoryError> {
        let data = self.data();
        if data.fail_reads {
            return Err(injected_failure());
        }
        Ok(data.parts.contains_key(part_number))
    }

    async fn insert_part(&self, part: &NewPart) -> Result<(), RepositoryError> {
        let mut data = self.data();
        data.insert_attempts += 1;
        if data.parts.contains_key(&part.part_number) {
            return Err(RepositoryError::Conflict(format!(
                "part {} already exists",
                part.part_number
            )));
        }

        let now = Utc::now();
        data.parts.insert(
            part.part_number.clone(),
            Part {
                part_number: part.part_number.clone(),
                description: part.description.clone(),
                category: part.category.clone(),
                material: part.material.clone(),
                thickness: part.thickness,
                qty_per_sheet: part.qty_per_sheet,
                stock_qnt: part.stock_qnt,
                sheet_price: part.sheet_price,
                multiplier: part.multiplier,
                price: part.price,
                status: part.status,
                user: part.user.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update_part_field(
        &self,
        part_number: &PartNumber,
        update: &FieldUpdate,
    ) -> Result<u64, RepositoryError> {
        let mut data = self.data();
        if data
            .failing_updates
            .contains(&(part_number.clone(), update.column()))
        {
            return Err(injected_failure());
        }

        let Some(part) = data.parts.get_mut(part_number) else {
            return Ok(0);
        };
        match update {
            FieldUpdate::Description(value) => part.description.clone_from(value),
            FieldUpdate::Category(value) => part.category.clone_from(value),
            FieldUpdate::StockQnt(value) => part.stock_qnt = *value,
        }
        part.updated_at = Utc::now();
        Ok(1)
    }

    async fn insert_stock_history(
        &self,
        entries: &[NewStockHistoryEntry],
    ) -> Result<u64, RepositoryError> {
        let mut data = self.data();
        if data.fail_history_insert {
            return Err(injected_failure());
        }

        for entry in entries {
            let id = i64::try_from(data.history.len()).unwrap() + 1;
            data.history.push(StockHistoryEntry {
                id,
                part_number: entry.part_number.clone(),
                description: entry.description.clone(),
                category: entry.category.clone(),
                stock_qnt: entry.stock_qnt,
                user: entry.user.clone(),
                timestamp: entry.timestamp,
            });
        }
        Ok(entries.len() as u64)
    }

    async fn list_stock_history(&self) -> Result<Vec<StockHistoryEntry>, RepositoryError> {
        let data = self.data();
        if data.fail_reads {
            return Err(injected_failure());
        }
        let mut entries = data.history.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let data = self.data();
        if data.fail_reads {
            return Err(injected_failure());
        }
        Ok(data.profiles.iter().find(|p| p.email == *email).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let mut data = self.data();
        if data.profiles.iter().any(|p| p.email == profile.email) {
            return Err(RepositoryError::Conflict(format!(
                "profile for {} already exists",
                profile.email
            )));
        }
        data.profiles.push(profile.clone());
        Ok(())
    }
}

// =============================================================================
// Fake auth provider
// =============================================================================

struct Account {
    id: Uuid,
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// `AuthProvider` backed by a map of accounts.
#[derive(Default)]
pub struct FakeAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
    certificate_failure: Mutex<bool>,
}

impl FakeAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account without sign-up metadata.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.lock_accounts().insert(
            email.to_string(),
            Account {
                id: Uuid::new_v4(),
                password: password.to_string(),
                first_name: None,
                last_name: None,
            },
        );
        self
    }

    /// Make every call fail as if the provider's certificate were invalid.
    pub fn set_certificate_failure(&self, failing: bool) {
        *self
            .certificate_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Whether an account exists for `email`.
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.lock_accounts().contains_key(email)
    }

    fn lock_accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_certificate(&self) -> Result<(), AuthError> {
        if *self
            .certificate_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(AuthError::Certificate(
                "invalid peer certificate: UnknownIssuer".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError> {
        self.check_certificate()?;

        let accounts = self.lock_accounts();
        let account = accounts
            .get(email.as_str())
            .filter(|a| a.password == password.expose_secret())
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthUser {
            id: account.id,
            email: email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
        })
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser, AuthError> {
        self.check_certificate()?;

        let mut accounts = self.lock_accounts();
        if accounts.contains_key(request.email.as_str()) {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let id = Uuid::new_v4();
        accounts.insert(
            request.email.to_string(),
            Account {
                id,
                password: request.password.expose_secret().to_string(),
                first_name: Some(request.first_name.clone()),
                last_name: Some(request.last_name.clone()),
            },
        );

        Ok(AuthUser {
            id,
            email: request.email.clone(),
            first_name: Some(request.first_name.clone()),
            last_name: Some(request.last_name.clone()),
        })
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Configuration for an in-process dashboard. Nothing here is dialled.
#[must_use]
pub fn test_config(dev_mode: bool) -> DashboardConfig {
    DashboardConfig {
        database_url: SecretString::from("postgres://unused@localhost/chronify_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        auth: AuthProviderConfig {
            url: Url::parse("http://127.0.0.1:54321").unwrap(),
            anon_key: SecretString::from("test-anon-key"),
        },
        dev_mode,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

/// An active part with the given stock and unit price in cents.
#[must_use]
pub fn part(part_number: &str, stock_qnt: i32, price_cents: i64) -> Part {
    let price = Decimal::new(price_cents, 2);
    Part {
        part_number: PartNumber::parse(part_number).unwrap(),
        description: format!("{part_number} description"),
        category: "Panels".to_string(),
        material: "Birch".to_string(),
        thickness: Decimal::new(18, 0),
        qty_per_sheet: Decimal::from(4),
        stock_qnt,
        sheet_price: price,
        multiplier: Decimal::ONE,
        price,
        status: PartStatus::Active,
        user: "seed@chronify.test".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// The full router over the given doubles, with in-memory sessions.
pub fn test_app(store: Arc<MemoryStore>, auth: Arc<FakeAuthProvider>, dev_mode: bool) -> Router {
    let config = test_config(dev_mode);
    let session_layer = configure_session_layer(tower_sessions::MemoryStore::default(), &config);
    let state = AppState::new(config, store, auth);
    chronify_dashboard::router(state).layer(session_layer)
}

// =============================================================================
// Request helpers
// =============================================================================

/// A GET request, optionally carrying a session cookie.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// A url-encoded form POST, optionally carrying a session cookie.
#[must_use]
pub fn post_form(uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_owned)
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Read the whole body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
