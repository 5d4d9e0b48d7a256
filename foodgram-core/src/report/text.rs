use super::layout::EMPTY_MESSAGE;
use crate::types::AggregatedLine;

/// Plain text export: one `name: amount, unit` line per ingredient, no numbering.
pub fn render_text(lines: &[AggregatedLine]) -> String {
    if lines.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }

    lines
        .iter()
        .map(|line| format!("{}: {}, {}\n", line.name, line.amount, line.measurement_unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_lines() {
        let lines = vec![
            AggregatedLine {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 500,
            },
            AggregatedLine {
                name: "milk".to_string(),
                measurement_unit: "ml".to_string(),
                amount: 1000,
            },
        ];
        assert_eq!(render_text(&lines), "flour: 500, g\nmilk: 1000, ml\n");
    }

    #[test]
    fn test_render_text_empty() {
        assert_eq!(render_text(&[]), "Your shopping list is empty.\n");
    }
}
