//! Stock report.

use std::fmt::Write as _;

use chronify_core::LOW_STOCK_THRESHOLD;
use chronify_dashboard::db::{InventoryStore, PgInventoryStore};
use chronify_dashboard::models::Part;
use chronify_dashboard::services::{InventoryMetrics, format_money};

use super::{CommandError, connect};

/// Print the home-page metrics, optionally followed by the low-stock parts.
pub async fn run(low_stock: bool) -> Result<(), CommandError> {
    let store = PgInventoryStore::new(connect().await?);
    let parts = store.list_parts().await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&parts, low_stock));
    }
    Ok(())
}

fn render(parts: &[Part], low_stock: bool) -> String {
    let metrics = InventoryMetrics::compute(parts);
    let mut out = String::new();

    let _ = writeln!(out, "Total products:  {}", metrics.total_items);
    let _ = writeln!(out, "Stock value:     {}", format_money(metrics.total_value));
    if metrics.value_overflowed {
        let _ = writeln!(out, "  (too large to compute; showing the maximum)");
    }
    let _ = writeln!(out, "Low stock items: {}", metrics.low_stock_count);

    if low_stock {
        let _ = writeln!(out);
        let _ = writeln!(out, "Parts with fewer than {LOW_STOCK_THRESHOLD} in stock:");
        let mut low: Vec<&Part> = parts.iter().filter(|p| p.is_low_stock()).collect();
        low.sort_by(|a, b| {
            a.stock_qnt
                .cmp(&b.stock_qnt)
                .then_with(|| a.part_number.cmp(&b.part_number))
        });
        if low.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for part in low {
            let _ = writeln!(
                out,
                "  {:<16} {:>5}  {}",
                part.part_number.as_str(),
                part.stock_qnt,
                part.description
            );
        }
    }

    out
}
