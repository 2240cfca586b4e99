//! Saving edits from the inventory management table.
//!
//! Runs `save_changes` against the in-memory store, including injected
//! update and audit failures.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;

use chronify_core::{Email, PartNumber};
use chronify_dashboard::db::InventoryStore;
use chronify_dashboard::models::{CurrentUser, EditableRow, NoticeLevel, Part, TrackedColumn};
use chronify_dashboard::services::inventory::{AuditOutcome, UpdateOutcome};
use chronify_dashboard::services::{EditedRow, save_changes};
use chronify_integration_tests::{MemoryStore, part};
use uuid::Uuid;

fn user() -> CurrentUser {
    CurrentUser::Authenticated {
        id: Uuid::new_v4(),
        email: Email::parse("clerk@chronify.test").unwrap(),
    }
}

fn snapshot(parts: &[Part]) -> HashMap<PartNumber, EditableRow> {
    parts
        .iter()
        .map(|p| (p.part_number.clone(), p.editable_row()))
        .collect()
}

fn edited(part: &Part, stock_qnt: &str) -> (PartNumber, EditedRow) {
    (
        part.part_number.clone(),
        EditedRow {
            stock_qnt: stock_qnt.to_string(),
            ..EditedRow::unchanged(&part.editable_row())
        },
    )
}

#[tokio::test]
async fn test_stock_edit_updates_part_and_logs_history() {
    let a = part("A", 5, 1000);
    let store = MemoryStore::with_parts([a.clone()]);

    let report = save_changes(&store, &user(), &snapshot(&[a.clone()]), &[edited(&a, "7")]).await;

    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].1, UpdateOutcome::Applied);
    assert_eq!(report.audit, AuditOutcome::Logged(1));
    assert_eq!(store.part("A").unwrap().stock_qnt, 7);

    let history = store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].stock_qnt, 7);
    assert_eq!(history[0].user, "clerk@chronify.test");
    assert_eq!(history[0].description, a.description);
}

#[tokio::test]
async fn test_identical_snapshot_writes_nothing() {
    let parts = [part("A", 5, 1000), part("B", 2, 250)];
    let store = MemoryStore::with_parts(parts.clone());
    let rows: Vec<_> = parts.iter().map(|p| edited(p, &p.stock_qnt.to_string())).collect();

    let report = save_changes(&store, &user(), &snapshot(&parts), &rows).await;

    assert!(report.is_empty());
    assert_eq!(report.audit, AuditOutcome::NotNeeded);
    assert!(store.history().is_empty());
    assert_eq!(report.notices()[0].message, "No changes detected.");
}

#[tokio::test]
async fn test_invalid_stock_is_coerced_to_zero_and_logged() {
    let a = part("A", 5, 1000);
    let store = MemoryStore::with_parts([a.clone()]);

    let report = save_changes(&store, &user(), &snapshot(&[a.clone()]), &[edited(&a, "abc")]).await;

    assert_eq!(store.part("A").unwrap().stock_qnt, 0);
    assert_eq!(store.history()[0].stock_qnt, 0);

    let notices = report.notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(
        notices[0].message,
        "Invalid stock quantity for part A: abc. Defaulting to 0."
    );
}

#[tokio::test]
async fn test_text_only_edit_is_not_audited() {
    let a = part("A", 5, 1000);
    let store = MemoryStore::with_parts([a.clone()]);
    let row = EditedRow {
        description: "Renamed".to_string(),
        ..EditedRow::unchanged(&a.editable_row())
    };

    let report = save_changes(&store, &user(), &snapshot(&[a.clone()]), &[(a.part_number.clone(), row)]).await;

    assert_eq!(report.applied(), 1);
    assert_eq!(report.audit, AuditOutcome::NotNeeded);
    assert_eq!(store.part("A").unwrap().description, "Renamed");
    assert!(store.history().is_empty());
}

#[tokio::test]
async fn test_failed_update_does_not_stop_later_updates() {
    let parts = [part("A", 5, 1000), part("B", 2, 250)];
    let store = MemoryStore::with_parts(parts.clone());
    store.fail_update("A", TrackedColumn::StockQnt);

    let rows = vec![edited(&parts[0], "9"), edited(&parts[1], "4")];
    let report = save_changes(&store, &user(), &snapshot(&parts), &rows).await;

    assert!(matches!(report.updates[0].1, UpdateOutcome::Failed(_)));
    assert_eq!(report.updates[1].1, UpdateOutcome::Applied);
    assert_eq!(store.part("A").unwrap().stock_qnt, 5);
    assert_eq!(store.part("B").unwrap().stock_qnt, 4);

    // The audit log records what the user submitted, whatever the update outcome.
    assert_eq!(report.audit, AuditOutcome::Logged(2));

    let notices = report.notices();
    assert!(
        notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.starts_with("Failed to update A -> stock_qnt"))
    );
    assert_eq!(notices.last().unwrap().message, "Saved 1 of 2 update(s).");
}

#[tokio::test]
async fn test_audit_failure_keeps_applied_updates() {
    let a = part("A", 5, 1000);
    let store = MemoryStore::with_parts([a.clone()]);
    store.fail_history_insert();

    let report = save_changes(&store, &user(), &snapshot(&[a.clone()]), &[edited(&a, "12")]).await;

    assert!(matches!(report.audit, AuditOutcome::Failed(_)));
    assert_eq!(store.part("A").unwrap().stock_qnt, 12);
    assert!(store.history().is_empty());
    assert!(
        report
            .notices()
            .iter()
            .any(|n| n.message.starts_with("Could not log changes to stock history"))
    );
}

#[tokio::test]
async fn test_row_missing_from_store_reports_no_match() {
    let store = MemoryStore::new();
    let row = (
        PartNumber::parse("NEW-1").unwrap(),
        EditedRow {
            description: "Fresh".to_string(),
            category: "Misc".to_string(),
            stock_qnt: "3".to_string(),
        },
    );

    let report = save_changes(&store, &user(), &HashMap::new(), &[row]).await;

    assert_eq!(report.updates.len(), 3);
    assert!(report.updates.iter().all(|(_, o)| *o == UpdateOutcome::NoMatch));
    assert_eq!(report.applied(), 0);
    assert!(store.parts().is_empty());
}

#[tokio::test]
async fn test_history_lists_newest_first() {
    let parts = [part("A", 5, 1000), part("B", 2, 250)];
    let store = MemoryStore::with_parts(parts.clone());

    save_changes(&store, &user(), &snapshot(&parts), &[edited(&parts[0], "6")]).await;
    let after_first: Vec<Part> = store.parts();
    save_changes(&store, &user(), &snapshot(&after_first), &[edited(&after_first[1], "8")]).await;

    let history = store.list_stock_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].part_number.as_str(), "B");
    assert_eq!(history[1].part_number.as_str(), "A");
}
