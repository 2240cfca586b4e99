//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first, see `main.rs`)
//!
//! 1. Sentry layers (capture errors, per-request hub)
//! 2. `TraceLayer` (request spans with status and latency)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler by the [`RequireAuth`] extractor.

pub mod auth;
pub mod flash;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use flash::{push_notices, take_notices};
pub use session::{SESSION_COOKIE_NAME, configure_session_layer, create_session_layer};
