//! Turns an aggregated shopping list into a downloadable file.

mod layout;
mod pdf;
mod text;

pub use layout::{format_line, layout, LayoutSettings, Page, PlacedText, EMPTY_MESSAGE, TITLE};
pub use pdf::{render_pdf, FontSource};
pub use text::render_text;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::types::AggregatedLine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Pdf,
    #[serde(alias = "text")]
    Txt,
}

impl ExportFormat {
    pub fn filename(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "Shopping_cart.pdf",
            ExportFormat::Txt => "cart.txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

/// A fully rendered file, always meant to be served as an attachment.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Artifact {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Render the shopping list in the requested format.
pub fn render(
    lines: &[AggregatedLine],
    format: ExportFormat,
    font: &FontSource,
) -> Result<Artifact, ReportError> {
    let body = match format {
        ExportFormat::Pdf => {
            let settings = LayoutSettings::default();
            let pages = layout(lines, &settings);
            tracing::debug!(
                lines = lines.len(),
                pages = pages.len(),
                "rendering shopping list pdf"
            );
            render_pdf(&pages, &settings, font)?
        }
        ExportFormat::Txt => render_text(lines).into_bytes(),
    };

    Ok(Artifact {
        filename: format.filename(),
        content_type: format.content_type(),
        body,
    })
}
