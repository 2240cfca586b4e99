//! Domain models for the dashboard.
//!
//! These are request-scoped copies of what the store owns; nothing here is
//! cached between requests.

pub mod notice;
pub mod part;
pub mod session;
pub mod stock_history;
pub mod user_profile;

pub use notice::{Notice, NoticeLevel};
pub use part::{EditableRow, FieldUpdate, NewPart, Part, TrackedColumn};
pub use session::{CurrentUser, keys as session_keys};
pub use stock_history::{NewStockHistoryEntry, StockHistoryEntry};
pub use user_profile::UserProfile;
