//! Notices carried across a redirect.

use tower_sessions::Session;

use crate::models::{Notice, session_keys};

/// Queue notices to show on the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_notices(
    session: &Session,
    notices: &[Notice],
) -> Result<(), tower_sessions::session::Error> {
    if notices.is_empty() {
        return Ok(());
    }

    let mut queued: Vec<Notice> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    queued.extend_from_slice(notices);
    session.insert(session_keys::FLASH, queued).await
}

/// Take and clear the queued notices.
///
/// Session failures are logged and yield no notices; a lost banner is not
/// worth failing the page for.
pub async fn take_notices(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(session_keys::FLASH).await {
        Ok(notices) => notices.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash notices");
            Vec::new()
        }
    }
}
