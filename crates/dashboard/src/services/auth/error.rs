//! Authentication error types.

use thiserror::Error;

use chronify_core::EmailError;

/// Errors returned by an [`AuthProvider`](super::AuthProvider).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// The provider refused the request for another reason.
    #[error("auth provider error: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// TLS certificate verification failed while reaching the provider.
    #[error("certificate verification failed: {0}")]
    Certificate(String),

    /// Network failure other than certificate verification.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a body we could not understand.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be built from configuration.
    #[error("client setup failed: {0}")]
    Setup(String),
}

/// Why a login attempt failed, phrased for the login page.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Login failed: invalid email or password.")]
    InvalidCredentials,

    #[error("TLS error with the auth provider and no valid offline credentials.")]
    CertificateNoFallback,

    #[error("Login error: {0}")]
    Provider(AuthError),
}

/// Why a sign-up attempt failed, phrased for the sign-up page.
#[derive(Debug, Error)]
pub enum SignUpError {
    /// Required fields left blank, in form order.
    #[error("Please fill in: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Cannot sign up: SSL certificate verification failed.")]
    Certificate,

    #[error("Sign-up error: {0}")]
    Provider(AuthError),
}
