//! Category aggregation for charting
//!
//! Sums line item amounts per category. Categories keep the order in which
//! they first appear on the receipt, and each one is assigned a chart color by
//! that position.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::LineItem;

/// Chart colors, cycled by first-seen category index
pub const PALETTE: [&str; 8] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#FF6384", "#C9CBCF",
];

/// Color for the category at `index` in first-seen order
pub fn color_for_index(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Per-category totals in first-seen order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoryAggregate {
    categories: Vec<String>,
    amounts: Vec<f64>,
}

impl CategoryAggregate {
    /// Category names in first-seen order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Summed amounts, aligned with `categories()`
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// Chart colors, aligned with `categories()`
    pub fn colors(&self) -> Vec<&'static str> {
        (0..self.categories.len()).map(color_for_index).collect()
    }

    /// Number of distinct categories
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum over all categories
    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Summed amount for one category
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.amounts[i])
    }

    /// Iterate `(category, amount)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.amounts.iter().copied())
    }
}

/// Sum effective amounts per effective category
pub fn aggregate(items: &[LineItem]) -> CategoryAggregate {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut result = CategoryAggregate::default();

    for item in items {
        let category = item.effective_category();
        let slot = *index.entry(category).or_insert_with(|| {
            result.categories.push(category.to_string());
            result.amounts.push(0.0);
            result.categories.len() - 1
        });
        result.amounts[slot] += item.effective_amount();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, amount: Option<f64>, category: Option<&str>) -> LineItem {
        LineItem::new(name, amount, category)
    }

    fn sample_items() -> Vec<LineItem> {
        vec![
            item("Milk", Some(2.50), Some("Groceries")),
            item("Bus", Some(1.20), Some("Transport")),
            item("Bread", Some(1.50), Some("Groceries")),
        ]
    }

    #[test]
    fn test_aggregate_groups_in_first_seen_order() {
        let agg = aggregate(&sample_items());

        assert_eq!(agg.categories(), ["Groceries", "Transport"]);
        assert!((agg.amounts()[0] - 4.00).abs() < 1e-9);
        assert!((agg.amounts()[1] - 1.20).abs() < 1e-9);
        assert_eq!(agg.category_count(), 2);
        assert!((agg.total() - 5.20).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_empty() {
        let agg = aggregate(&[]);
        assert!(agg.is_empty());
        assert_eq!(agg.category_count(), 0);
        assert_eq!(agg.total(), 0.0);
        assert!(agg.colors().is_empty());
    }

    #[test]
    fn test_missing_category_grouped_under_other() {
        let items = vec![
            item("Gum", Some(1.0), None),
            item("Pen", Some(2.0), Some("")),
            item("Tea", Some(3.0), Some("Food")),
        ];
        let agg = aggregate(&items);

        assert_eq!(agg.categories(), ["Other", "Food"]);
        assert_eq!(agg.get("Other"), Some(3.0));
        assert_eq!(agg.get("Food"), Some(3.0));
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let items = vec![
            item("Mystery", None, Some("Shopping")),
            item("Shirt", Some(20.0), Some("Shopping")),
        ];
        let agg = aggregate(&items);
        assert_eq!(agg.get("Shopping"), Some(20.0));
    }

    #[test]
    fn test_category_with_only_missing_amounts_still_listed() {
        let agg = aggregate(&[item("Mystery", None, Some("Healthcare"))]);
        assert_eq!(agg.categories(), ["Healthcare"]);
        assert_eq!(agg.get("Healthcare"), Some(0.0));
    }

    #[test]
    fn test_sum_preserved() {
        let items = vec![
            item("a", Some(0.1), Some("A")),
            item("b", Some(0.2), Some("B")),
            item("c", None, None),
            item("d", Some(1e6), Some("A")),
            item("e", Some(-3.5), Some("C")),
            item("f", Some(7.25), Some("B")),
        ];
        let expected: f64 = items.iter().map(|i| i.effective_amount()).sum();
        let agg = aggregate(&items);
        assert!((agg.total() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_intra_category_order_does_not_change_totals() {
        let forward = aggregate(&sample_items());
        let swapped = aggregate(&[
            item("Bread", Some(1.50), Some("Groceries")),
            item("Bus", Some(1.20), Some("Transport")),
            item("Milk", Some(2.50), Some("Groceries")),
        ]);

        assert_eq!(forward.categories(), swapped.categories());
        for (category, amount) in forward.iter() {
            let other = swapped.get(category).unwrap();
            assert!((amount - other).abs() < 1e-9);
        }
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let items = sample_items();
        assert_eq!(aggregate(&items), aggregate(&items));
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let agg = aggregate(&[
            item("a", Some(1.0), Some("Food")),
            item("b", Some(1.0), Some("food")),
        ]);
        assert_eq!(agg.category_count(), 2);
    }

    #[test]
    fn test_colors_follow_first_seen_order() {
        let agg = aggregate(&sample_items());
        assert_eq!(agg.colors(), vec!["#FF6384", "#36A2EB"]);
    }

    #[test]
    fn test_colors_wrap_around_palette() {
        let items: Vec<LineItem> = (0..10)
            .map(|i| LineItem::new("x", Some(1.0), Some(format!("Cat{}", i).as_str())))
            .collect();
        let colors = aggregate(&items).colors();

        assert_eq!(colors.len(), 10);
        assert_eq!(colors[8], PALETTE[0]);
        assert_eq!(colors[9], PALETTE[1]);
        assert_eq!(color_for_index(17), PALETTE[1]);
    }
}
