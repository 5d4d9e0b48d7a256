//! Merges the ingredients of every recipe on a shopping list into one line per
//! (name, measurement unit) pair.

use std::collections::BTreeMap;

use crate::types::{AggregatedLine, IngredientAmount};

/// Sum amounts per (name, unit).
///
/// Lines come out sorted by name, then unit. The same name with a different unit
/// stays a separate line. Amounts are assumed to be already validated as positive.
pub fn aggregate<I>(items: I) -> Vec<AggregatedLine>
where
    I: IntoIterator<Item = IngredientAmount>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for item in items {
        *totals
            .entry((item.name, item.measurement_unit))
            .or_insert(0) += i64::from(item.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| AggregatedLine {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_empty_list() {
        assert!(aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_sums_same_ingredient_across_recipes() {
        let items = vec![
            IngredientAmount::new("flour", "g", 200),
            IngredientAmount::new("flour", "g", 300),
            IngredientAmount::new("sugar", "g", 50),
        ];
        assert_eq!(
            aggregate(items),
            vec![line("flour", "g", 500), line("sugar", "g", 50)]
        );
    }

    #[test]
    fn test_different_units_stay_separate() {
        let items = vec![
            IngredientAmount::new("flour", "grams", 100),
            IngredientAmount::new("flour", "cups", 2),
            IngredientAmount::new("flour", "grams", 50),
        ];
        assert_eq!(
            aggregate(items),
            vec![line("flour", "cups", 2), line("flour", "grams", 150)]
        );
    }

    #[test]
    fn test_order_is_independent_of_input_order() {
        let forward = vec![
            IngredientAmount::new("salt", "pinch", 1),
            IngredientAmount::new("butter", "g", 20),
            IngredientAmount::new("eggs", "pcs", 2),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let names: Vec<String> = aggregate(forward.clone()).into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["butter", "eggs", "salt"]);
        assert_eq!(aggregate(forward), aggregate(backward));
    }

    #[test]
    fn test_totals_do_not_overflow_i32() {
        let items = (0..300_000).map(|_| IngredientAmount::new("water", "ml", 10_000));
        let lines = aggregate(items);
        assert_eq!(lines, vec![line("water", "ml", 3_000_000_000)]);
    }
}
