//! HTML to PDF rendering engine.
//!
//! Writes the HTML to a temporary directory, runs the headless renderer on it
//! and reads the produced PDF back.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use actix_web::web;
use async_trait::async_trait;
use tempfile::tempdir;

use super::{PageConfig, RenderError};

const SOURCE_FILE: &str = "order.html";
const OUTPUT_FILE: &str = "order.pdf";

#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn html_to_pdf(&self, html: &str, page: &PageConfig) -> Result<Vec<u8>, RenderError>;
}

/// Engine backed by the `wkhtmltopdf` command line renderer.
pub struct WkhtmltopdfEngine {
    binary: String,
}

impl WkhtmltopdfEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PdfEngine for WkhtmltopdfEngine {
    async fn html_to_pdf(&self, html: &str, page: &PageConfig) -> Result<Vec<u8>, RenderError> {
        let binary = self.binary.clone();
        let html = html.to_owned();
        let page = page.clone();

        web::block(move || render_blocking(&binary, &html, &page))
            .await
            .map_err(|e| RenderError::Blocking(e.to_string()))?
    }
}

/// Command line flags for the given page setup.
pub fn page_args(page: &PageConfig) -> Vec<String> {
    vec![
        "--quiet".to_string(),
        "--encoding".to_string(),
        "utf-8".to_string(),
        "--page-size".to_string(),
        page.format.clone(),
        "--margin-top".to_string(),
        page.margin.top.clone(),
        "--margin-right".to_string(),
        page.margin.right.clone(),
        "--margin-bottom".to_string(),
        page.margin.bottom.clone(),
        "--margin-left".to_string(),
        page.margin.left.clone(),
    ]
}

fn render_blocking(binary: &str, html: &str, page: &PageConfig) -> Result<Vec<u8>, RenderError> {
    let temp_dir = tempdir().map_err(RenderError::TempDir)?;
    let source_path = temp_dir.path().join(SOURCE_FILE);
    let output_path = temp_dir.path().join(OUTPUT_FILE);

    fs::write(&source_path, html).map_err(RenderError::WriteHtml)?;

    run_engine(binary, page, &source_path, &output_path)?;

    let pdf = fs::read(&output_path).map_err(RenderError::ReadPdf)?;
    if pdf.is_empty() {
        return Err(RenderError::EmptyOutput);
    }

    log::debug!("Rendered PDF ({} bytes)", pdf.len());
    Ok(pdf)
}

fn run_engine(
    binary: &str,
    page: &PageConfig,
    source_path: &Path,
    output_path: &Path,
) -> Result<(), RenderError> {
    let status = Command::new(binary)
        .args(page_args(page))
        .arg(source_path)
        .arg(output_path)
        .stdin(Stdio::null())
        .status()
        .map_err(RenderError::EngineIo)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(RenderError::EngineExit(code));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_args_for_default_page() {
        let args = page_args(&PageConfig::default());
        let joined = args.join(" ");
        assert!(joined.contains("--page-size A4"));
        assert!(joined.contains("--margin-top 20mm"));
        assert!(joined.contains("--margin-right 20mm"));
        assert!(joined.contains("--margin-bottom 20mm"));
        assert!(joined.contains("--margin-left 20mm"));
    }

    #[actix_web::test]
    async fn test_missing_binary_is_engine_error() {
        let engine = WkhtmltopdfEngine::new("definitely-not-a-pdf-engine-binary");
        let err = engine
            .html_to_pdf("<p>hi</p>", &PageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::EngineIo(_)));
    }

    #[actix_web::test]
    async fn test_failing_binary_reports_exit_code() {
        // `false` ignores its arguments and exits with status 1.
        let engine = WkhtmltopdfEngine::new("false");
        let err = engine
            .html_to_pdf("<p>hi</p>", &PageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::EngineExit(1)));
    }
}
