//! Derived inventory metrics for the home page and the CLI report.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Part;

/// Totals computed over the full parts list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryMetrics {
    pub total_items: usize,
    /// Sum of `stock_qnt * price` over every part, capped at `Decimal::MAX`.
    pub total_value: Decimal,
    /// Set when the total hit the cap.
    pub value_overflowed: bool,
    /// Parts below the low-stock threshold.
    pub low_stock_count: usize,
}

impl InventoryMetrics {
    #[must_use]
    pub fn compute(parts: &[Part]) -> Self {
        let mut total_value = Decimal::ZERO;
        let mut value_overflowed = false;
        for part in parts {
            match part.stock_value().and_then(|v| total_value.checked_add(v)) {
                Some(sum) => total_value = sum,
                None => {
                    value_overflowed = true;
                    total_value = Decimal::MAX;
                    break;
                }
            }
        }

        Self {
            total_items: parts.len(),
            total_value,
            value_overflowed,
            low_stock_count: parts.iter().filter(|p| p.is_low_stock()).count(),
        }
    }
}

/// Format an amount as dollars with thousands separators: `$1,234.56`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use chronify_core::{PartNumber, PartStatus};

    use super::*;

    fn part(n: usize, stock_qnt: i32, price: Decimal) -> Part {
        Part {
            part_number: PartNumber::parse(&format!("P-{n}")).unwrap(),
            description: String::new(),
            category: String::new(),
            material: String::new(),
            thickness: Decimal::ZERO,
            qty_per_sheet: Decimal::ZERO,
            stock_qnt,
            sheet_price: Decimal::ZERO,
            multiplier: Decimal::ONE,
            price,
            status: PartStatus::Active,
            user: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_low_stock_count() {
        let parts: Vec<_> = [0, 2, 3, 10]
            .into_iter()
            .enumerate()
            .map(|(i, q)| part(i, q, Decimal::ONE))
            .collect();
        let metrics = InventoryMetrics::compute(&parts);
        assert_eq!(metrics.low_stock_count, 2);
        assert_eq!(metrics.total_items, 4);
    }

    #[test]
    fn test_total_value() {
        let parts = vec![part(0, 2, Decimal::new(50, 1)), part(1, 0, Decimal::new(1000, 1))];
        assert_eq!(InventoryMetrics::compute(&parts).total_value, Decimal::new(100, 1));
    }

    #[test]
    fn test_total_value_caps_on_overflow() {
        let parts = vec![
            part(0, 1, Decimal::MAX),
            part(1, 1, Decimal::ONE),
            part(2, 0, Decimal::ONE),
        ];
        let metrics = InventoryMetrics::compute(&parts);
        assert!(metrics.value_overflowed);
        assert_eq!(metrics.total_value, Decimal::MAX);
        assert_eq!(metrics.total_items, 3);
        assert_eq!(metrics.low_stock_count, 3);

        let single = InventoryMetrics::compute(&[part(0, 5, Decimal::MAX)]);
        assert!(single.value_overflowed);
    }

    #[test]
    fn test_empty_inventory() {
        assert_eq!(InventoryMetrics::compute(&[]), InventoryMetrics::default());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::new(10, 0)), "$10.00");
        assert_eq!(format_money(Decimal::new(123_456_789, 2)), "$1,234,567.89");
        assert_eq!(format_money(Decimal::new(100_000, 0)), "$100,000.00");
        assert_eq!(format_money(Decimal::new(12_345, 3)), "$12.35");
        assert_eq!(format_money(Decimal::new(-150_050, 2)), "-$1,500.50");
    }
}
