//! Dashboard authentication.
//!
//! Credentials are checked by an external auth provider; the dashboard keeps
//! only the returned identity in the session and mirrors it into
//! `user_profiles` the first time the user logs in.
//!
//! When the provider cannot be reached because TLS certificate verification
//! fails, a single offline test account is let in as a mock identity. Every
//! other account gets an error.

mod error;
mod gotrue;

pub use error::{AuthError, LoginError, SignUpError};
pub use gotrue::GoTrueClient;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use uuid::Uuid;

use chronify_core::Email;

use crate::db::InventoryStore;
use crate::models::{CurrentUser, Notice, UserProfile};

/// Account admitted when the provider fails certificate verification.
pub const OFFLINE_FALLBACK_EMAIL: &str = "test@test.com";
const OFFLINE_FALLBACK_PASSWORD: &str = "123";

/// Identity returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Account details sent to the provider on sign-up.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: Email,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

/// Email/password identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser, AuthError>;
}

/// Raw sign-up form fields.
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoggedIn {
    pub user: CurrentUser,
    pub notices: Vec<Notice>,
}

/// Authentication service.
///
/// Borrows the provider and the store from application state for the
/// duration of one request.
pub struct AuthService<'a> {
    provider: &'a dyn AuthProvider,
    store: &'a dyn InventoryStore,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(provider: &'a dyn AuthProvider, store: &'a dyn InventoryStore) -> Self {
        Self { provider, store }
    }

    /// Log in with email and password.
    ///
    /// A missing user profile is created on the way; failing to create it is
    /// reported as a warning and does not fail the login.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::InvalidCredentials` for a rejected password,
    /// `LoginError::CertificateNoFallback` when TLS verification fails for any
    /// account other than the offline fallback, and `LoginError::Provider`
    /// for other provider failures.
    #[instrument(skip(self, password))]
    pub async fn log_in(&self, email: &str, password: &SecretString) -> Result<LoggedIn, LoginError> {
        let email = Email::parse(email)?;

        let auth_user = match self.provider.sign_in(&email, password).await {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                tracing::info!(email = %email, "Login rejected");
                return Err(LoginError::InvalidCredentials);
            }
            Err(AuthError::Certificate(detail)) => {
                tracing::warn!(email = %email, error = %detail, "Auth provider certificate failure");
                return offline_fallback(email, password);
            }
            Err(e) => {
                tracing::error!(email = %email, error = %e, "Auth provider error");
                return Err(LoginError::Provider(e));
            }
        };

        let mut notices = vec![Notice::success(format!(
            "Logged in as: {}",
            auth_user.email
        ))];
        if let Some(notice) = self.ensure_profile(&auth_user).await {
            notices.push(notice);
        }

        tracing::info!(email = %auth_user.email, "Logged in");
        Ok(LoggedIn {
            user: CurrentUser::Authenticated {
                id: auth_user.id,
                email: auth_user.email,
            },
            notices,
        })
    }

    /// Register a new account with the provider.
    ///
    /// Returns the notices to show on success.
    ///
    /// # Errors
    ///
    /// Returns `SignUpError::MissingFields` listing blank fields,
    /// `SignUpError::PasswordMismatch`, `SignUpError::Certificate` on TLS
    /// verification failure, or `SignUpError::Provider`.
    #[instrument(skip_all, fields(email = %input.email.trim()))]
    pub async fn sign_up(&self, input: &SignUpInput) -> Result<Vec<Notice>, SignUpError> {
        let missing: Vec<&'static str> = [
            ("Email", input.email.trim().is_empty()),
            ("Password", input.password.expose_secret().is_empty()),
            (
                "Confirm Password",
                input.confirm_password.expose_secret().is_empty(),
            ),
            ("First Name", input.first_name.trim().is_empty()),
            ("Last Name", input.last_name.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();

        if !missing.is_empty() {
            return Err(SignUpError::MissingFields(missing));
        }
        if input.password.expose_secret() != input.confirm_password.expose_secret() {
            return Err(SignUpError::PasswordMismatch);
        }

        let request = SignUpRequest {
            email: Email::parse(&input.email)?,
            password: input.password.clone(),
            first_name: input.first_name.trim().to_owned(),
            last_name: input.last_name.trim().to_owned(),
        };

        match self.provider.sign_up(&request).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Account created");
                Ok(vec![
                    Notice::success("Account created! Please check your email to confirm."),
                    Notice::info("Once confirmed, log in with your email and password."),
                ])
            }
            Err(AuthError::Certificate(detail)) => {
                tracing::warn!(error = %detail, "Auth provider certificate failure on sign-up");
                Err(SignUpError::Certificate)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sign-up failed");
                Err(SignUpError::Provider(e))
            }
        }
    }

    /// Create the user's profile if it does not exist yet.
    ///
    /// Returns the notice to show, if any.
    async fn ensure_profile(&self, user: &AuthUser) -> Option<Notice> {
        match self.store.find_profile_by_email(&user.email).await {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(email = %user.email, error = %e, "Profile lookup failed");
                return Some(Notice::warning(format!("Could not insert profile: {e}")));
            }
        }

        let profile = profile_for(user);
        match self.store.insert_profile(&profile).await {
            Ok(()) => {
                tracing::info!(email = %user.email, "Profile created on login");
                Some(Notice::info("Profile created on login."))
            }
            Err(e) => {
                tracing::warn!(email = %user.email, error = %e, "Profile insert failed");
                Some(Notice::warning(format!("Could not insert profile: {e}")))
            }
        }
    }
}

/// Profile for a first login: names from sign-up metadata when present,
/// otherwise the email's local part as the first name.
fn profile_for(user: &AuthUser) -> UserProfile {
    let first_name = user
        .first_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map_or_else(|| user.email.local_part().to_owned(), str::to_owned);

    UserProfile {
        id: user.id,
        email: user.email.clone(),
        first_name,
        last_name: user.last_name.clone().unwrap_or_default(),
    }
}

fn offline_fallback(email: Email, password: &SecretString) -> Result<LoggedIn, LoginError> {
    if email.as_str() != OFFLINE_FALLBACK_EMAIL
        || password.expose_secret() != OFFLINE_FALLBACK_PASSWORD
    {
        return Err(LoginError::CertificateNoFallback);
    }

    tracing::warn!("Using offline fallback identity");
    Ok(LoggedIn {
        user: CurrentUser::Mock { email },
        notices: vec![Notice::warning(
            "Auth provider TLS error: logged in using offline fallback.",
        )],
    })
}
