// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Programmatic interface — one source PDF, its private temp workspace, and the
// five extraction operations as direct calls.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::StructuredElement;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

use crate::images::ImageExtractor;
use crate::ocr::OcrEngine;
use crate::pdf::reader::PdfReader;
use crate::structured::StructuredExtractor;
use crate::tables::TableExtractor;
use crate::tools::{SystemRunner, ToolRunner};

/// Every PDF starts with this signature.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Tables written by [`PdfParser::extract_tables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutput {
    pub workbook: PathBuf,
    pub count: usize,
}

/// A source PDF plus a temp workspace for intermediates.
///
/// The workspace is deleted by [`cleanup`](Self::cleanup) or when the parser is
/// dropped, unless [`keep_temp`](Self::keep_temp) persists it.
pub struct PdfParser {
    pdf_path: PathBuf,
    config: SiftConfig,
    runner: Arc<dyn ToolRunner>,
    temp_dir: TempDir,
}

impl PdfParser {
    /// Open `path` with the system's external tools.
    pub fn open(path: impl AsRef<Path>, config: SiftConfig) -> Result<Self> {
        Self::with_runner(path, config, Arc::new(SystemRunner))
    }

    /// Open `path`, running external tools through `runner`.
    ///
    /// Fails with [`SiftError::InputNotFound`] or [`SiftError::NotAPdf`]
    /// before anything is created on disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_runner(
        path: impl AsRef<Path>,
        config: SiftConfig,
        runner: Arc<dyn ToolRunner>,
    ) -> Result<Self> {
        let pdf_path = path.as_ref().to_path_buf();
        validate_input(&pdf_path)?;

        let temp_dir = tempfile::Builder::new().prefix("pdfsift-").tempdir()?;
        info!(temp_dir = %temp_dir.path().display(), "Workspace created");

        Ok(Self {
            pdf_path,
            config,
            runner,
            temp_dir,
        })
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    /// The temp workspace holding intermediates.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// File name of the source, used to derive output names.
    pub fn file_name(&self) -> String {
        self.pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".into())
    }

    /// File stem of the source, used to derive output names.
    pub fn file_stem(&self) -> String {
        self.pdf_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into())
    }

    fn reader(&self) -> Result<PdfReader> {
        PdfReader::open(&self.pdf_path)
    }

    // -- Operations -----------------------------------------------------------

    /// OCR the document into `ocr_<name>` inside the workspace.
    pub fn perform_ocr(&self) -> Result<PathBuf> {
        let output = self.temp_dir().join(format!("ocr_{}", self.file_name()));
        let reader = self.reader()?;
        OcrEngine::new(self.runner.as_ref(), &self.config).ocr_document(
            &reader,
            &self.pdf_path,
            self.temp_dir(),
            &output,
        )?;
        Ok(output)
    }

    /// Text of every page, in page order.
    #[instrument(skip(self))]
    pub fn extract_text(&self) -> Result<String> {
        let text = self.reader()?.text()?;
        if text.trim().is_empty() {
            warn!("no text found in document");
        }
        Ok(text)
    }

    /// Write embedded images into `images/` inside the workspace.
    pub fn extract_images(&self) -> Result<Vec<PathBuf>> {
        let reader = self.reader()?;
        ImageExtractor::new(self.runner.as_ref(), &self.config)
            .extract(&reader, &self.temp_dir().join("images"))
    }

    /// Save detected tables to `tables_<stem>.xlsx` inside the workspace.
    /// `None` when no table was found.
    pub fn extract_tables(&self) -> Result<Option<TableOutput>> {
        let workbook = self.temp_dir().join(format!("tables_{}.xlsx", self.file_stem()));
        let count = TableExtractor::new(self.runner.as_ref(), &self.config)
            .extract(&self.pdf_path, &workbook)?;
        Ok((count > 0).then_some(TableOutput { workbook, count }))
    }

    /// Classified document elements.
    pub fn extract_structured_content(&self) -> Result<Vec<StructuredElement>> {
        StructuredExtractor::new(self.runner.as_ref(), &self.config)
            .extract(&self.pdf_path, self.temp_dir())
    }

    // -- Workspace lifetime ---------------------------------------------------

    /// Delete the workspace and everything in it.
    pub fn cleanup(self) -> Result<()> {
        let path = self.temp_dir.path().to_path_buf();
        self.temp_dir.close()?;
        info!(temp_dir = %path.display(), "Workspace removed");
        Ok(())
    }

    /// Keep the workspace on disk and return its path.
    pub fn keep_temp(self) -> PathBuf {
        let path = self.temp_dir.keep();
        info!(temp_dir = %path.display(), "Workspace kept");
        path
    }
}

/// Check that `path` is an existing regular file starting with `%PDF-`.
pub fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SiftError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SiftError::NotAPdf(path.to_path_buf()));
    }

    let mut header = [0u8; PDF_SIGNATURE.len()];
    let mut file = std::fs::File::open(path)?;
    let read = file.read(&mut header)?;
    if read < header.len() || header != PDF_SIGNATURE {
        return Err(SiftError::NotAPdf(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeRunner, FixtureImage, OCR_TEXT, write_fixture};

    fn parser(dir: &Path, pages: &[Option<&str>], image: Option<FixtureImage>) -> PdfParser {
        let source = write_fixture(dir, "report.pdf", pages, image);
        PdfParser::with_runner(source, SiftConfig::default(), Arc::new(FakeRunner::new()))
            .expect("open")
    }

    #[test]
    fn missing_input_is_reported_before_any_workspace() {
        let err = PdfParser::open("/definitely/not/here.pdf", SiftConfig::default())
            .err()
            .expect("should fail");
        assert!(matches!(err, SiftError::InputNotFound(_)));
    }

    #[test]
    fn non_pdf_input_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"just some notes").expect("write");
        assert!(matches!(
            PdfParser::open(&path, SiftConfig::default()),
            Err(SiftError::NotAPdf(_))
        ));

        let short = dir.path().join("short.pdf");
        std::fs::write(&short, b"%PD").expect("write");
        assert!(matches!(validate_input(&short), Err(SiftError::NotAPdf(_))));

        assert!(matches!(validate_input(dir.path()), Err(SiftError::NotAPdf(_))));
    }

    #[test]
    fn workspace_has_prefix_and_is_removed_by_cleanup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let parser = parser(dir.path(), &[Some("text")], None);
        let workspace = parser.temp_dir().to_path_buf();
        assert!(workspace.is_dir());
        let name = workspace.file_name().expect("name").to_string_lossy().into_owned();
        assert!(name.starts_with("pdfsift-"));

        parser.cleanup().expect("cleanup");
        assert!(!workspace.exists());
    }

    #[test]
    fn keep_temp_persists_the_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let parser = parser(dir.path(), &[Some("text")], None);
        let kept = parser.keep_temp();
        assert!(kept.is_dir());
        std::fs::remove_dir_all(&kept).expect("remove kept workspace");
    }

    #[test]
    fn operations_write_into_the_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let parser = parser(dir.path(), &[Some("first page"), None], Some(FixtureImage::Jpeg));

        let ocr = parser.perform_ocr().expect("ocr");
        assert_eq!(ocr, parser.temp_dir().join("ocr_report.pdf"));
        let ocr_reader = PdfReader::open(&ocr).expect("ocr pdf");
        assert!(ocr_reader.page_text(2).expect("page 2").contains(OCR_TEXT));

        assert!(parser.extract_text().expect("text").contains("first page"));

        let images = parser.extract_images().expect("images");
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|p| p.starts_with(parser.temp_dir().join("images"))));

        let tables = parser.extract_tables().expect("tables").expect("some tables");
        assert_eq!(tables.count, 1);
        assert_eq!(tables.workbook, parser.temp_dir().join("tables_report.xlsx"));

        let elements = parser.extract_structured_content().expect("structured");
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn blank_document_yields_empty_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let parser = parser(dir.path(), &[None], None);
        assert!(parser.extract_text().expect("text").trim().is_empty());
    }
}
