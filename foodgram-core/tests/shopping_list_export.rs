//! End-to-end tests for the shopping list pipeline: recipe ingredients in,
//! downloadable file out.

use std::thread;
use std::time::Duration;

use foodgram_core::report::{layout, LayoutSettings, EMPTY_MESSAGE, TITLE};
use foodgram_core::{
    aggregate, render, AggregatedLine, ExportFormat, FontSource, IngredientAmount, ReportError,
};
use printpdf::lopdf::content::Content;
use printpdf::lopdf::{Document, Object};
use ttf_parser::Face;

const DEJAVU_SANS: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Ingredients of recipe A {flour 200 g} and recipe B {flour 300 g, sugar 50 g}.
fn two_recipes() -> Vec<IngredientAmount> {
    vec![
        IngredientAmount::new("flour", "g", 200),
        IngredientAmount::new("flour", "g", 300),
        IngredientAmount::new("sugar", "g", 50),
    ]
}

/// Every string shown with `Tj`, in page order.
fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(pdf).unwrap();
    let mut shown = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        for op in content.operations {
            if op.operator == "Tj" {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    shown.push(bytes.clone());
                }
            }
        }
    }
    shown
}

/// Two-byte glyph ids for `text`, as an embedded TrueType face writes them.
fn glyph_string(face: &Face, text: &str) -> Vec<u8> {
    text.chars()
        .flat_map(|c| face.glyph_index(c).unwrap().0.to_be_bytes())
        .collect()
}

fn many_ingredients(n: usize) -> Vec<IngredientAmount> {
    (0..n)
        .map(|i| IngredientAmount::new(format!("ingredient {:04}", i), "g", 10))
        .collect()
}

#[test]
fn test_two_recipes_aggregate_and_export_as_text() {
    let lines = aggregate(two_recipes());
    assert_eq!(
        lines,
        vec![
            AggregatedLine {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 500,
            },
            AggregatedLine {
                name: "sugar".to_string(),
                measurement_unit: "g".to_string(),
                amount: 50,
            },
        ]
    );

    let artifact = render(&lines, ExportFormat::Txt, &FontSource::Bundled).unwrap();
    assert_eq!(artifact.filename, "cart.txt");
    assert_eq!(
        String::from_utf8(artifact.body).unwrap(),
        "flour: 500, g\nsugar: 50, g\n"
    );
}

#[test]
fn test_aggregated_total_matches_sum_per_key() {
    let recipes = vec![
        vec![
            IngredientAmount::new("milk", "ml", 250),
            IngredientAmount::new("eggs", "pcs", 3),
        ],
        vec![
            IngredientAmount::new("milk", "ml", 100),
            IngredientAmount::new("milk", "l", 1),
        ],
        vec![IngredientAmount::new("eggs", "pcs", 1)],
    ];

    let expected_milk_ml: i64 = recipes
        .iter()
        .flatten()
        .filter(|i| i.name == "milk" && i.measurement_unit == "ml")
        .map(|i| i64::from(i.amount))
        .sum();

    let lines = aggregate(recipes.into_iter().flatten());
    assert_eq!(lines.len(), 3);

    let milk_ml = lines
        .iter()
        .find(|l| l.name == "milk" && l.measurement_unit == "ml")
        .unwrap();
    assert_eq!(milk_ml.amount, expected_milk_ml);
    assert!(lines
        .iter()
        .any(|l| l.name == "milk" && l.measurement_unit == "l" && l.amount == 1));
}

#[test]
fn test_export_is_idempotent() {
    let first = aggregate(many_ingredients(120));
    let second = aggregate(many_ingredients(120));
    assert_eq!(first, second);

    let settings = LayoutSettings::default();
    assert_eq!(layout(&first, &settings), layout(&second, &settings));

    let a = render(&first, ExportFormat::Txt, &FontSource::Bundled).unwrap();
    let b = render(&second, ExportFormat::Txt, &FontSource::Bundled).unwrap();
    assert_eq!(a.body, b.body);

    // Straddle a second boundary so a wall-clock timestamp would show up.
    let a = render(&first, ExportFormat::Pdf, &FontSource::Bundled).unwrap();
    thread::sleep(Duration::from_millis(1100));
    let b = render(&second, ExportFormat::Pdf, &FontSource::Bundled).unwrap();
    assert_eq!(a.body, b.body);
}

#[test]
fn test_cyrillic_names_reach_the_pdf() {
    let lines = aggregate(vec![
        IngredientAmount::new("мука", "г", 200),
        IngredientAmount::new("мука", "г", 150),
        IngredientAmount::new("яйца", "шт", 3),
    ]);
    let artifact = render(&lines, ExportFormat::Pdf, &FontSource::Bundled).unwrap();

    let face = Face::parse(DEJAVU_SANS, 0).unwrap();
    let shown = shown_strings(&artifact.body);
    assert_eq!(
        shown,
        vec![
            glyph_string(&face, TITLE),
            glyph_string(&face, "1. мука - 350 г."),
            glyph_string(&face, "2. яйца - 3 шт."),
        ]
    );
}

#[test]
fn test_name_outside_the_font_is_an_error() {
    let lines = aggregate(vec![IngredientAmount::new("食パン", "шт", 1)]);
    match render(&lines, ExportFormat::Pdf, &FontSource::Bundled) {
        Err(ReportError::MissingGlyph { ch, .. }) => assert_eq!(ch, '食'),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("rendered a name the font cannot draw"),
    }

    // Plain text has no such limit.
    let artifact = render(&lines, ExportFormat::Txt, &FontSource::Bundled).unwrap();
    assert!(String::from_utf8(artifact.body).unwrap().contains("食パン"));
}

#[test]
fn test_empty_list_renders_single_page_with_message() {
    let lines = aggregate(Vec::new());
    let pages = layout(&lines, &LayoutSettings::default());
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].items[0].text, EMPTY_MESSAGE);

    let artifact = render(&lines, ExportFormat::Pdf, &FontSource::Bundled).unwrap();
    assert_eq!(artifact.filename, "Shopping_cart.pdf");
    assert_eq!(artifact.content_type, "application/pdf");
    assert!(artifact.body.starts_with(b"%PDF-"));
}

#[test]
fn test_long_list_spans_pages_with_running_index() {
    let settings = LayoutSettings::default();
    let count = settings.lines_per_page() + 10;
    let lines = aggregate(many_ingredients(count));

    let pages = layout(&lines, &settings);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].items[0].text, TITLE);

    let first_on_second_page = &pages[1].items[0].text;
    assert_eq!(
        first_on_second_page,
        &format!(
            "{}. ingredient {:04} - 10 g.",
            settings.lines_per_page() + 1,
            settings.lines_per_page()
        )
    );

    let artifact = render(&lines, ExportFormat::Pdf, &FontSource::Bundled).unwrap();
    assert!(artifact.body.starts_with(b"%PDF-"));
}

#[test]
fn test_missing_font_fails_instead_of_rendering() {
    let lines = aggregate(two_recipes());
    let font = FontSource::File("/definitely/not/here.ttf".into());
    assert!(matches!(
        render(&lines, ExportFormat::Pdf, &font),
        Err(ReportError::FontUnavailable { .. })
    ));

    // The text export never needs a font.
    assert!(render(&lines, ExportFormat::Txt, &font).is_ok());
}
