//! Login and sign-up through `AuthService`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chronify_dashboard::models::{CurrentUser, NoticeLevel};
use chronify_dashboard::services::auth::SignUpInput;
use chronify_dashboard::services::{AuthService, LoginError, SignUpError};
use chronify_integration_tests::{FakeAuthProvider, MemoryStore};
use secrecy::SecretString;

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn sign_up_input(password: &str, confirm: &str) -> SignUpInput {
    SignUpInput {
        email: "new.user@chronify.test".to_string(),
        password: secret(password),
        confirm_password: secret(confirm),
        first_name: "New".to_string(),
        last_name: "User".to_string(),
    }
}

#[tokio::test]
async fn test_first_login_creates_profile_once() {
    let provider = FakeAuthProvider::new().with_account("jane.doe@chronify.test", "hunter22");
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let first = service
        .log_in("jane.doe@chronify.test", &secret("hunter22"))
        .await
        .unwrap();
    assert!(matches!(first.user, CurrentUser::Authenticated { .. }));
    assert_eq!(first.notices[0].message, "Logged in as: jane.doe@chronify.test");
    assert_eq!(first.notices[1].message, "Profile created on login.");

    let profiles = store.profiles();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].first_name, "jane.doe");
    assert_eq!(profiles[0].last_name, "");

    let second = service
        .log_in("jane.doe@chronify.test", &secret("hunter22"))
        .await
        .unwrap();
    assert_eq!(second.notices.len(), 1);
    assert_eq!(store.profiles().len(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let provider = FakeAuthProvider::new().with_account("jane@chronify.test", "right");
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let err = service
        .log_in("jane@chronify.test", &secret("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(store.profiles().is_empty());
}

#[tokio::test]
async fn test_malformed_email_is_rejected_before_provider() {
    let provider = FakeAuthProvider::new();
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let err = service.log_in("not-an-email", &secret("x")).await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidEmail(_)));
}

#[tokio::test]
async fn test_certificate_failure_admits_only_offline_account() {
    let provider = FakeAuthProvider::new().with_account("jane@chronify.test", "right");
    provider.set_certificate_failure(true);
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let fallback = service.log_in("test@test.com", &secret("123")).await.unwrap();
    assert!(fallback.user.is_mock());
    assert_eq!(fallback.notices[0].level, NoticeLevel::Warning);

    let wrong_password = service.log_in("test@test.com", &secret("124")).await.unwrap_err();
    assert!(matches!(wrong_password, LoginError::CertificateNoFallback));

    let other = service
        .log_in("jane@chronify.test", &secret("right"))
        .await
        .unwrap_err();
    assert!(matches!(other, LoginError::CertificateNoFallback));
    assert!(store.profiles().is_empty());
}

#[tokio::test]
async fn test_sign_up_lists_missing_fields_in_form_order() {
    let provider = FakeAuthProvider::new();
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let input = SignUpInput {
        email: "  ".to_string(),
        first_name: String::new(),
        ..sign_up_input("", "mismatch")
    };
    let err = service.sign_up(&input).await.unwrap_err();

    assert_eq!(err.to_string(), "Please fill in: Email, Password, First Name");
}

#[tokio::test]
async fn test_sign_up_password_mismatch() {
    let provider = FakeAuthProvider::new();
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let err = service.sign_up(&sign_up_input("abc123", "abc124")).await.unwrap_err();

    assert!(matches!(err, SignUpError::PasswordMismatch));
    assert!(!provider.has_account("new.user@chronify.test"));
}

#[tokio::test]
async fn test_sign_up_then_log_in_uses_metadata_names() {
    let provider = FakeAuthProvider::new();
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let notices = service.sign_up(&sign_up_input("abc123", "abc123")).await.unwrap();
    assert_eq!(
        notices[0].message,
        "Account created! Please check your email to confirm."
    );

    service
        .log_in("new.user@chronify.test", &secret("abc123"))
        .await
        .unwrap();
    let profiles = store.profiles();
    assert_eq!(profiles[0].first_name, "New");
    assert_eq!(profiles[0].last_name, "User");
}

#[tokio::test]
async fn test_sign_up_certificate_failure() {
    let provider = FakeAuthProvider::new();
    provider.set_certificate_failure(true);
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let err = service.sign_up(&sign_up_input("abc123", "abc123")).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Cannot sign up: SSL certificate verification failed."
    );
}

#[tokio::test]
async fn test_sign_up_existing_account_is_provider_error() {
    let provider = FakeAuthProvider::new().with_account("new.user@chronify.test", "old");
    let store = MemoryStore::new();
    let service = AuthService::new(&provider, &store);

    let err = service.sign_up(&sign_up_input("abc123", "abc123")).await.unwrap_err();

    assert!(matches!(err, SignUpError::Provider(_)));
    assert!(err.to_string().starts_with("Sign-up error:"));
}
