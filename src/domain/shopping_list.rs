//! Shopping list aggregation.
//!
//! Sums ingredient amounts over every recipe in a user's cart and renders the
//! result as the plain-text attachment served by
//! `GET /api/recipes/download_shopping_cart`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::domain::entities::CartLine;

/// First line of every exported shopping list, followed by a blank line.
pub const SHOPPING_LIST_HEADER: &str = "Список покупок:\n\n";

/// File name of the exported attachment.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Total amount of one ingredient across the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Groups cart lines by ingredient and sums their amounts.
///
/// The aggregation key is the ingredient record itself, so two ingredients that
/// share a name but have different units stay separate lines. Output is sorted by
/// name, then by ingredient id.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: HashMap<i64, ShoppingListItem> = HashMap::new();

    for line in lines {
        totals
            .entry(line.ingredient_id)
            .and_modify(|item| item.total_amount += i64::from(line.amount))
            .or_insert_with(|| ShoppingListItem {
                ingredient_id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                total_amount: i64::from(line.amount),
            });
    }

    let mut items: Vec<ShoppingListItem> = totals.into_values().collect();
    items.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
    });
    items
}

/// Renders aggregated items as `"{name}: {total}{unit}"` lines under the header.
pub fn render(items: &[ShoppingListItem]) -> String {
    let mut text = String::from(SHOPPING_LIST_HEADER);
    for item in items {
        let _ = writeln!(
            text,
            "{}: {}{}",
            item.name, item.total_amount, item.measurement_unit
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            ingredient_id: id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_empty_cart_renders_header_only() {
        let items = aggregate(Vec::new());

        assert!(items.is_empty());
        assert_eq!(render(&items), "Список покупок:\n\n");
    }

    #[test]
    fn test_same_ingredient_is_summed() {
        let items = aggregate(vec![line(1, "Salt", "g", 5), line(1, "Salt", "g", 10)]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_amount, 15);
        assert_eq!(render(&items), "Список покупок:\n\nSalt: 15g\n");
    }

    #[test]
    fn test_items_sorted_by_name() {
        let items = aggregate(vec![
            line(3, "Sugar", "g", 100),
            line(1, "Eggs", "pcs", 2),
            line(2, "Milk", "ml", 200),
            line(1, "Eggs", "pcs", 3),
        ]);

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Milk", "Sugar"]);
        assert_eq!(items[0].total_amount, 5);
    }

    #[test]
    fn test_distinct_ingredients_with_same_name_stay_separate() {
        let items = aggregate(vec![
            line(7, "Butter", "g", 50),
            line(8, "Butter", "tbsp", 2),
            line(7, "Butter", "g", 25),
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].ingredient_id, 7);
        assert_eq!(items[0].total_amount, 75);
        assert_eq!(items[1].ingredient_id, 8);
        assert_eq!(items[1].total_amount, 2);
    }

    #[test]
    fn test_totals_do_not_overflow_i32() {
        let items = aggregate(vec![
            line(1, "Flour", "g", i32::MAX),
            line(1, "Flour", "g", i32::MAX),
        ]);

        assert_eq!(items[0].total_amount, 2 * i64::from(i32::MAX));
    }
}
