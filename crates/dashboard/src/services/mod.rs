//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `auth` - Login and sign-up against the hosted auth provider
//! - `inventory` - Change detection and persistence for the management table
//! - `metrics` - Totals and low-stock counts for the home page
//! - `parts` - Adding parts with the duplicate-key guard

pub mod auth;
pub mod inventory;
pub mod metrics;
pub mod parts;

pub use auth::{AuthError, AuthProvider, AuthService, GoTrueClient, LoginError, SignUpError};
pub use inventory::{EditedRow, SaveReport, detect_changes, save_changes};
pub use metrics::{InventoryMetrics, format_money};
pub use parts::{AddPartError, AddPartInput, add_part, compute_price};
