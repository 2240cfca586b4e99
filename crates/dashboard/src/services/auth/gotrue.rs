//! HTTP client for the hosted auth REST API (`/auth/v1`).
//!
//! # Endpoints
//!
//! - `POST /auth/v1/token?grant_type=password` - email/password sign-in
//! - `POST /auth/v1/signup` - account creation, names sent as user metadata
//!
//! Requests carry the project's anon key in both the `apikey` and the
//! `Authorization: Bearer` headers.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use chronify_core::Email;

use super::{AuthError, AuthProvider, AuthUser, SignUpRequest};
use crate::config::AuthProviderConfig;

/// Auth REST API client.
#[derive(Clone)]
pub struct GoTrueClient {
    inner: Arc<GoTrueClientInner>,
}

struct GoTrueClientInner {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: UserMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

/// Sign-in always returns a session; sign-up returns a session when email
/// confirmation is off and the bare user when it is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserResponse {
    Session { user: GoTrueUser },
    User(GoTrueUser),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn is_invalid_credentials(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
            || self.error_code.as_deref() == Some("invalid_credentials")
    }

    fn message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

impl GoTrueClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Setup` if the anon key is not a valid header value
    /// or the HTTP client fails to build.
    pub fn new(config: &AuthProviderConfig) -> Result<Self, AuthError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| AuthError::Setup(format!("Invalid anon key format: {e}")))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| AuthError::Setup(format!("Invalid anon key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AuthError::Setup(e.to_string()))?;

        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(GoTrueClientInner { client, base_url }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| AuthError::Setup(format!("Invalid auth URL: {e}")))
    }

    async fn post<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<AuthUser, AuthError> {
        let response = self
            .inner
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let parsed: UserResponse = response
                .json()
                .await
                .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse response: {e}")))?;
            return into_auth_user(parsed);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        if body.is_invalid_credentials() {
            return Err(AuthError::InvalidCredentials);
        }

        Err(AuthError::Rejected {
            status: status.as_u16(),
            message: body
                .message()
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
                .to_owned(),
        })
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        self.post(
            url,
            &PasswordGrant {
                email: email.as_str(),
                password: password.expose_secret(),
            },
        )
        .await
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser, AuthError> {
        let url = self.endpoint("auth/v1/signup")?;

        self.post(
            url,
            &SignUpBody {
                email: request.email.as_str(),
                password: request.password.expose_secret(),
                data: UserMetadata {
                    first_name: Some(request.first_name.clone()),
                    last_name: Some(request.last_name.clone()),
                },
            },
        )
        .await
    }
}

fn into_auth_user(response: UserResponse) -> Result<AuthUser, AuthError> {
    let user = match response {
        UserResponse::Session { user } | UserResponse::User(user) => user,
    };

    let email = user
        .email
        .as_deref()
        .ok_or_else(|| AuthError::InvalidResponse("user has no email".to_owned()))
        .and_then(|e| Email::parse(e).map_err(|err| AuthError::InvalidResponse(err.to_string())))?;
    let metadata = user.user_metadata.unwrap_or_default();

    Ok(AuthUser {
        id: user.id,
        email,
        first_name: metadata.first_name,
        last_name: metadata.last_name,
    })
}

fn transport_error(err: reqwest::Error) -> AuthError {
    if is_certificate_failure(&err) {
        AuthError::Certificate(error_chain(&err))
    } else {
        AuthError::Transport(error_chain(&err))
    }
}

/// Whether any error in the source chain mentions a certificate.
fn is_certificate_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.to_string().to_ascii_lowercase().contains("certificate") {
            return true;
        }
        current = e.source();
    }
    false
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        out.push_str(": ");
        out.push_str(&e.to_string());
        current = e.source();
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("invalid peer certificate: UnknownIssuer")]
    struct Inner;

    #[test]
    fn test_certificate_failure_found_in_chain() {
        let err = Outer(Inner);
        assert!(is_certificate_failure(&err));
        assert_eq!(
            error_chain(&err),
            "error sending request: invalid peer certificate: UnknownIssuer"
        );
        assert!(!is_certificate_failure(&Inner2));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Inner2;

    #[test]
    fn test_parse_session_response() {
        let json = r#"{
            "access_token": "t",
            "user": {
                "id": "00000000-0000-0000-0000-000000000001",
                "email": "a@b.co",
                "user_metadata": {"first_name": "Ada", "last_name": "Lovelace"}
            }
        }"#;
        let user = into_auth_user(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(user.email.as_str(), "a@b.co");
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_parse_bare_user_response() {
        let json = r#"{"id": "00000000-0000-0000-0000-000000000002", "email": "c@d.co"}"#;
        let user = into_auth_user(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(user.email.as_str(), "c@d.co");
        assert!(user.first_name.is_none());
    }

    #[test]
    fn test_invalid_credentials_body() {
        let legacy: ErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .unwrap();
        assert!(legacy.is_invalid_credentials());

        let current: ErrorBody =
            serde_json::from_str(r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#)
                .unwrap();
        assert!(current.is_invalid_credentials());

        let other: ErrorBody =
            serde_json::from_str(r#"{"code":422,"error_code":"weak_password","msg":"Password too short"}"#)
                .unwrap();
        assert!(!other.is_invalid_credentials());
        assert_eq!(other.message(), Some("Password too short"));
    }
}
