//! Rendering module - order document to HTML to PDF.
//!
//! - `template` - Tera template population for the hand-over act
//! - `engine` - HTML to PDF conversion through an external headless renderer

pub mod engine;
pub mod template;

pub use engine::{PdfEngine, WkhtmltopdfEngine};
pub use template::OrderTemplate;

use thiserror::Error;

/// Errors that can occur while producing the PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render template: {0}")]
    Template(String),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("PDF engine execution failed: {0}")]
    EngineIo(#[source] std::io::Error),
    #[error("PDF engine exited with status {0}")]
    EngineExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("PDF engine produced an empty file")]
    EmptyOutput,
    #[error("PDF render task failed: {0}")]
    Blocking(String),
}

impl From<tera::Error> for RenderError {
    fn from(e: tera::Error) -> Self {
        // Tera keeps the useful detail in the source chain.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        RenderError::Template(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Margins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Margins {
    pub fn uniform(value: &str) -> Self {
        Self {
            top: value.to_string(),
            right: value.to_string(),
            bottom: value.to_string(),
            left: value.to_string(),
        }
    }
}

/// Page setup handed to the PDF engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub format: String,
    pub margin: Margins,
}

impl Default for PageConfig {
    /// A4 with 20mm on every side.
    fn default() -> Self {
        Self {
            format: "A4".to_string(),
            margin: Margins::uniform("20mm"),
        }
    }
}
