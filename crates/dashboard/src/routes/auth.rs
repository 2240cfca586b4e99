//! Authentication route handlers.
//!
//! Email and password are checked by the auth provider; the resulting
//! identity is kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, push_notices, set_current_user, take_notices};
use crate::models::Notice;
use crate::routes::UserView;
use crate::services::AuthService;
use crate::services::auth::SignUpInput;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub email: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/signup", get(signup_page).post(signup))
        .route("/auth/logout", post(logout))
}

fn login_template(notices: Vec<Notice>, email: String) -> LoginTemplate {
    LoginTemplate {
        user: None,
        current_path: "/auth/login".to_string(),
        notices,
        email,
    }
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(OptionalAuth(user): OptionalAuth, session: Session) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let notices = take_notices(&session).await;
    login_template(notices, String::new()).into_response()
}

/// Log in with email and password.
///
/// POST /auth/login
#[instrument(skip_all, fields(email = %form.email.trim()))]
async fn login(
    OptionalAuth(current): OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let service = AuthService::new(state.auth(), state.store());
    let password = SecretString::from(form.password);
    match service.log_in(&form.email, &password).await {
        Ok(logged_in) => {
            set_current_user(&session, &logged_in.user).await?;
            push_notices(&session, &logged_in.notices).await?;
            set_sentry_user(logged_in.user.email().as_str());
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => Ok(
            login_template(vec![Notice::error(e.to_string())], form.email.trim().to_owned())
                .into_response(),
        ),
    }
}

/// Render the sign-up page.
///
/// GET /auth/signup
async fn signup_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SignUpTemplate {
        user: None,
        current_path: "/auth/signup".to_string(),
        notices: Vec::new(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
    }
    .into_response()
}

/// Create an account.
///
/// POST /auth/signup
#[instrument(skip_all, fields(email = %form.email.trim()))]
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    let input = SignUpInput {
        email: form.email,
        password: SecretString::from(form.password),
        confirm_password: SecretString::from(form.confirm_password),
        first_name: form.first_name,
        last_name: form.last_name,
    };

    let service = AuthService::new(state.auth(), state.store());
    match service.sign_up(&input).await {
        Ok(notices) => {
            push_notices(&session, &notices).await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(e) => Ok(SignUpTemplate {
            user: None,
            current_path: "/auth/signup".to_string(),
            notices: vec![Notice::error(e.to_string())],
            email: input.email.trim().to_owned(),
            first_name: input.first_name,
            last_name: input.last_name,
        }
        .into_response()),
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();

    Redirect::to("/auth/login")
}
