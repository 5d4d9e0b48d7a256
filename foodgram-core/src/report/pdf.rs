use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use printpdf::lopdf::{self, Object, StringFormat};
use printpdf::{Mm, OffsetDateTime, PdfDocument};
use ttf_parser::Face;

use super::layout::Page;
use super::LayoutSettings;
use crate::error::ReportError;

const DOCUMENT_TITLE: &str = "Shopping cart";
const LAYER_NAME: &str = "Layer 1";

/// DejaVu Sans Book. Covers Latin, Greek and Cyrillic, which is what ingredient names are written in.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Where the embedded PDF face comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FontSource {
    /// DejaVu Sans, compiled into the crate.
    #[default]
    Bundled,
    /// A TrueType file read at render time. A missing file fails the export.
    File(PathBuf),
}

impl FontSource {
    fn load(&self) -> Result<Cow<'static, [u8]>, ReportError> {
        match self {
            FontSource::Bundled => Ok(Cow::Borrowed(BUNDLED_FONT)),
            FontSource::File(path) => fs::read(path).map(Cow::Owned).map_err(|source| {
                ReportError::FontUnavailable {
                    path: path.clone(),
                    source,
                }
            }),
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Bundled => write!(f, "bundled DejaVu Sans"),
            FontSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn pdf_error(e: impl fmt::Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

/// printpdf drops characters the face has no glyph for, so refuse them up front.
fn check_coverage(face: &Face, pages: &[Page]) -> Result<(), ReportError> {
    for item in pages.iter().flat_map(|page| &page.items) {
        if let Some(ch) = item.text.chars().find(|&c| face.glyph_index(c).is_none()) {
            return Err(ReportError::MissingGlyph {
                ch,
                text: item.text.clone(),
            });
        }
    }
    Ok(())
}

/// MD5 over the face and everything drawn, hex encoded.
fn document_id(font: &[u8], pages: &[Page]) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(font);
    for (number, page) in pages.iter().enumerate() {
        ctx.consume((number as u64).to_be_bytes());
        for item in &page.items {
            ctx.consume(item.x.to_bits().to_be_bytes());
            ctx.consume(item.y.to_bits().to_be_bytes());
            ctx.consume(item.size.to_bits().to_be_bytes());
            ctx.consume(item.text.as_bytes());
            ctx.consume([0u8]);
        }
    }
    format!("{:x}", ctx.compute())
}

/// printpdf pairs the document id with a random instance id on every save.
/// Both halves of the trailer `/ID` become the content id instead.
fn stamp_document_id(raw: &[u8], id: &str) -> Result<Vec<u8>, ReportError> {
    let mut pdf = lopdf::Document::load_mem(raw).map_err(pdf_error)?;
    let id = Object::String(id.as_bytes().to_vec(), StringFormat::Literal);
    pdf.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes).map_err(pdf_error)?;
    Ok(bytes)
}

/// Draw laid-out pages into a PDF document and return its bytes.
///
/// The same pages and font always produce the same bytes: dates are pinned to
/// the Unix epoch and the document id is derived from the content.
pub fn render_pdf(
    pages: &[Page],
    settings: &LayoutSettings,
    font: &FontSource,
) -> Result<Vec<u8>, ReportError> {
    let font_bytes = font.load()?;
    let face = Face::parse(&font_bytes, 0).map_err(|e| ReportError::InvalidFont {
        font: font.to_string(),
        reason: e.to_string(),
    })?;
    check_coverage(&face, pages)?;
    let id = document_id(&font_bytes, pages);

    let width = pt_to_mm(settings.page_width);
    let height = pt_to_mm(settings.page_height);

    let (doc, first_page, first_layer) = PdfDocument::new(DOCUMENT_TITLE, width, height, LAYER_NAME);
    let doc = doc
        .with_document_id(id.clone())
        .with_creation_date(OffsetDateTime::UNIX_EPOCH)
        .with_mod_date(OffsetDateTime::UNIX_EPOCH)
        .with_metadata_date(OffsetDateTime::UNIX_EPOCH);

    let face_ref = doc
        .add_external_font(&font_bytes[..])
        .map_err(|e| ReportError::InvalidFont {
            font: font.to_string(),
            reason: e.to_string(),
        })?;

    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..pages.len() {
        targets.push(doc.add_page(width, height, LAYER_NAME));
    }

    for ((page_index, layer_index), page) in targets.into_iter().zip(pages) {
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for item in &page.items {
            layer.use_text(
                item.text.as_str(),
                item.size,
                pt_to_mm(item.x),
                pt_to_mm(item.y),
                &face_ref,
            );
        }
    }

    let raw = doc.save_to_bytes().map_err(pdf_error)?;
    stamp_document_id(&raw, &id)
}
