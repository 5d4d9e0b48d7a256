//! Page layout for the printable shopping list.
//!
//! Coordinates are PostScript points with the origin at the bottom left of the page,
//! which is what PDF uses natively.

use crate::types::AggregatedLine;

pub const TITLE: &str = "Shopping list:";
pub const EMPTY_MESSAGE: &str = "Your shopping list is empty.";

/// Geometry of the printed page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub page_width: f32,
    pub page_height: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    /// Baseline of the title on the first page.
    pub title_y: f32,
    /// Distance from the title baseline to the first body baseline.
    pub title_gap: f32,
    pub bottom_margin: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub line_height: f32,
}

impl Default for LayoutSettings {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            left_margin: 50.0,
            right_margin: 50.0,
            title_y: 800.0,
            title_gap: 20.0,
            bottom_margin: 50.0,
            title_size: 24.0,
            body_size: 12.0,
            line_height: 15.0,
        }
    }
}

impl LayoutSettings {
    /// Baseline of the first body line on every page.
    pub fn body_top(&self) -> f32 {
        self.title_y - self.title_gap
    }

    /// Number of body lines a page holds.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.body_top() - self.bottom_margin;
        if usable < 0.0 || self.line_height <= 0.0 {
            return 1;
        }
        (usable / self.line_height).floor() as usize + 1
    }

    pub fn printable_width(&self) -> f32 {
        self.page_width - self.left_margin - self.right_margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PlacedText>,
}

pub fn format_line(index: usize, line: &AggregatedLine) -> String {
    format!(
        "{}. {} - {} {}.",
        index, line.name, line.amount, line.measurement_unit
    )
}

/// Rough width of `text` in points, at about half an em per glyph.
fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Lay the shopping list out on pages.
///
/// The title is drawn on the first page only. Continuation pages start directly with
/// body lines at the same body top, and the running index never resets. Lines are never
/// wrapped or truncated.
pub fn layout(lines: &[AggregatedLine], settings: &LayoutSettings) -> Vec<Page> {
    if lines.is_empty() {
        return vec![Page {
            items: vec![PlacedText {
                text: EMPTY_MESSAGE.to_string(),
                x: settings.left_margin,
                y: settings.title_y,
                size: settings.title_size,
            }],
        }];
    }

    let mut pages = Vec::new();
    let mut current = Page {
        items: vec![PlacedText {
            text: TITLE.to_string(),
            x: settings.left_margin,
            y: settings.title_y,
            size: settings.title_size,
        }],
    };
    let mut cursor = settings.body_top();

    for (index, line) in lines.iter().enumerate() {
        if cursor < settings.bottom_margin {
            pages.push(std::mem::take(&mut current));
            cursor = settings.body_top();
        }

        let text = format_line(index + 1, line);
        if estimated_width(&text, settings.body_size) > settings.printable_width() {
            tracing::warn!(
                line = index + 1,
                "shopping list line is wider than the page and will overflow the right margin"
            );
        }

        current.items.push(PlacedText {
            text,
            x: settings.left_margin,
            y: cursor,
            size: settings.body_size,
        });
        cursor -= settings.line_height;
    }

    pages.push(current);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<AggregatedLine> {
        (0..n)
            .map(|i| AggregatedLine {
                name: format!("item{:03}", i),
                measurement_unit: "g".to_string(),
                amount: (i + 1) as i64,
            })
            .collect()
    }

    #[test]
    fn test_format_line() {
        let line = AggregatedLine {
            name: "flour".to_string(),
            measurement_unit: "g".to_string(),
            amount: 12500,
        };
        assert_eq!(format_line(3, &line), "3. flour - 12500 g.");
    }

    #[test]
    fn test_default_capacity() {
        // Body runs from 780 down to 60 in 15pt steps.
        assert_eq!(LayoutSettings::default().lines_per_page(), 49);
    }

    #[test]
    fn test_empty_list_is_single_message_page() {
        let pages = layout(&[], &LayoutSettings::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].items.len(), 1);
        assert_eq!(pages[0].items[0].text, EMPTY_MESSAGE);
    }

    #[test]
    fn test_title_then_lines_on_first_page() {
        let settings = LayoutSettings::default();
        let pages = layout(&lines(2), &settings);
        assert_eq!(pages.len(), 1);

        let items = &pages[0].items;
        assert_eq!(items[0].text, TITLE);
        assert_eq!(items[0].y, 800.0);
        assert_eq!(items[0].size, 24.0);
        assert_eq!(items[1].text, "1. item000 - 1 g.");
        assert_eq!(items[1].y, 780.0);
        assert_eq!(items[2].y, 765.0);
        assert_eq!(items[2].size, 12.0);
    }

    #[test]
    fn test_exactly_one_full_page_has_no_trailing_page() {
        let settings = LayoutSettings::default();
        let pages = layout(&lines(settings.lines_per_page()), &settings);
        assert_eq!(pages.len(), 1);
        let last = pages[0].items.last().unwrap();
        assert!(last.y >= settings.bottom_margin);
    }

    #[test]
    fn test_overflow_starts_new_page_without_title() {
        let settings = LayoutSettings::default();
        let per_page = settings.lines_per_page();
        let pages = layout(&lines(per_page + 3), &settings);
        assert_eq!(pages.len(), 2);

        // Title plus a full page of lines
        assert_eq!(pages[0].items.len(), per_page + 1);

        let second = &pages[1].items;
        assert_eq!(second.len(), 3);
        assert!(second.iter().all(|item| item.text != TITLE));
        assert_eq!(second[0].y, settings.body_top());
        assert!(second[0].text.starts_with(&format!("{}. ", per_page + 1)));
    }

    #[test]
    fn test_index_runs_across_pages() {
        let settings = LayoutSettings::default();
        let total = settings.lines_per_page() * 3 + 1;
        let pages = layout(&lines(total), &settings);
        assert_eq!(pages.len(), 4);

        let numbers: Vec<usize> = pages
            .iter()
            .flat_map(|page| page.items.iter())
            .filter(|item| item.text != TITLE)
            .map(|item| item.text.split('.').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(numbers, (1..=total).collect::<Vec<_>>());
    }

    #[test]
    fn test_no_line_below_bottom_margin() {
        let settings = LayoutSettings::default();
        let pages = layout(&lines(200), &settings);
        for page in &pages {
            for item in &page.items {
                assert!(item.y >= settings.bottom_margin, "{:?}", item);
            }
        }
    }

    #[test]
    fn test_long_line_is_kept_verbatim() {
        let long = AggregatedLine {
            name: "x".repeat(300),
            measurement_unit: "g".to_string(),
            amount: 1,
        };
        let pages = layout(std::slice::from_ref(&long), &LayoutSettings::default());
        assert_eq!(pages[0].items[1].text, format_line(1, &long));
    }
}
