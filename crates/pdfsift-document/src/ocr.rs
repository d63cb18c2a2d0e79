// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) for pdfsift.
//
// Pages without a text layer are rendered to PNG with Ghostscript, Tesseract
// turns each image into a one-page searchable PDF, and the result is assembled
// from those pages plus the untouched originals. Pages that already carry text
// are kept as they are unless `force_ocr` is set.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::Tool;
use tracing::{debug, info, instrument};

use crate::pdf::reader::{PdfReader, assemble_pages};
use crate::tools::{ToolRunner, os_args};

/// What an OCR run did to each page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrSummary {
    /// Pages rendered and recognised.
    pub recognised_pages: Vec<u32>,
    /// Pages kept because they already had text.
    pub skipped_pages: Vec<u32>,
}

/// Runs Ghostscript and Tesseract over a document.
pub struct OcrEngine<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a SiftConfig,
}

impl<'a> OcrEngine<'a> {
    pub fn new(runner: &'a dyn ToolRunner, config: &'a SiftConfig) -> Self {
        Self { runner, config }
    }

    /// OCR the document at `source` and write the searchable PDF to `output`.
    ///
    /// Intermediate page images and page PDFs go into `work_dir`. When no page
    /// needs recognition the source file is copied to `output` unchanged.
    #[instrument(skip_all, fields(source = %source.display(), output = %output.display()))]
    pub fn ocr_document(
        &self,
        reader: &PdfReader,
        source: &Path,
        work_dir: &Path,
        output: &Path,
    ) -> Result<OcrSummary> {
        let settings = &self.config.ocr;
        info!(
            language = %settings.language,
            dpi = settings.dpi,
            force = settings.force_ocr,
            "Starting OCR"
        );

        let pages_dir = work_dir.join("ocr-pages");
        std::fs::create_dir_all(&pages_dir)?;

        let mut summary = OcrSummary::default();
        let mut recognised: Vec<(u32, PdfReader)> = Vec::new();

        for page in reader.page_numbers() {
            if !settings.force_ocr && reader.page_has_text(page) {
                debug!(page, "page already has text, skipping");
                summary.skipped_pages.push(page);
                continue;
            }

            let image = pages_dir.join(format!("page-{page:04}.png"));
            self.render_page(source, page, &image)?;
            let page_pdf = self.recognise(&image, &pages_dir.join(format!("page-{page:04}")))?;
            let page_reader = PdfReader::open(&page_pdf).map_err(|err| {
                SiftError::OcrError(format!("unreadable Tesseract output for page {page}: {err}"))
            })?;
            recognised.push((page, page_reader));
            summary.recognised_pages.push(page);
        }

        if recognised.is_empty() {
            info!("every page already has text; copying source unchanged");
            std::fs::copy(source, output)?;
            return Ok(summary);
        }

        // Source 0 is the original; source i + 1 is the i-th recognised page.
        let mut sources = vec![reader.document()];
        sources.extend(recognised.iter().map(|(_, page_reader)| page_reader.document()));
        let order: Vec<(usize, u32)> = reader
            .page_numbers()
            .into_iter()
            .map(|page| {
                match recognised.iter().position(|(recognised_page, _)| *recognised_page == page) {
                    Some(i) => (i + 1, 1),
                    None => (0, page),
                }
            })
            .collect();

        let bytes = assemble_pages(&sources, &order)?;
        std::fs::write(output, bytes)?;

        info!(
            recognised = summary.recognised_pages.len(),
            skipped = summary.skipped_pages.len(),
            "OCR complete"
        );
        Ok(summary)
    }

    /// Render one page to a 24-bit PNG.
    fn render_page(&self, source: &Path, page: u32, image: &Path) -> Result<()> {
        let mut output_arg = OsString::from("-sOutputFile=");
        output_arg.push(image);

        let mut args = os_args([
            "-dSAFER".to_string(),
            "-dBATCH".to_string(),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-sDEVICE=png16m".to_string(),
            format!("-r{}", self.config.ocr.dpi),
            format!("-dFirstPage={page}"),
            format!("-dLastPage={page}"),
        ]);
        args.push(output_arg);
        args.push(source.as_os_str().to_os_string());

        self.runner.run(
            Tool::Ghostscript,
            self.config.tools.program(Tool::Ghostscript),
            &args,
        )?;
        if !image.is_file() {
            return Err(SiftError::OcrError(format!(
                "Ghostscript produced no image for page {page}"
            )));
        }
        Ok(())
    }

    /// Recognise `image` into `<base>.pdf`.
    fn recognise(&self, image: &Path, base: &Path) -> Result<PathBuf> {
        let settings = &self.config.ocr;
        let mut args = os_args([image.as_os_str(), base.as_os_str()]);
        args.extend(os_args([
            "-l".to_string(),
            settings.language.clone(),
            "--dpi".to_string(),
            settings.dpi.to_string(),
            "pdf".to_string(),
        ]));

        self.runner.run(
            Tool::Tesseract,
            self.config.tools.program(Tool::Tesseract),
            &args,
        )?;

        let pdf = base.with_extension("pdf");
        if !pdf.is_file() {
            return Err(SiftError::OcrError(format!(
                "Tesseract produced no PDF at {}",
                pdf.display()
            )));
        }
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeRunner, OCR_TEXT, write_fixture};

    fn run(
        runner: &FakeRunner,
        config: &SiftConfig,
        pages: &[Option<&str>],
    ) -> (tempfile::TempDir, PathBuf, Result<OcrSummary>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_fixture(dir.path(), "scan.pdf", pages, None);
        let output = dir.path().join("ocr_scan.pdf");
        let reader = PdfReader::open(&source).expect("open");
        let result =
            OcrEngine::new(runner, config).ocr_document(&reader, &source, dir.path(), &output);
        (dir, output, result)
    }

    #[test]
    fn only_pages_without_text_are_recognised() {
        let runner = FakeRunner::new();
        let config = SiftConfig::default();
        let (_dir, output, result) = run(&runner, &config, &[Some("typed page"), None]);

        let summary = result.expect("ocr");
        assert_eq!(summary.recognised_pages, vec![2]);
        assert_eq!(summary.skipped_pages, vec![1]);
        assert_eq!(runner.calls_to(Tool::Ghostscript), 1);
        assert_eq!(runner.calls_to(Tool::Tesseract), 1);

        let merged = PdfReader::open(&output).expect("merged");
        assert_eq!(merged.page_count(), 2);
        assert!(merged.page_text(1).expect("p1").contains("typed page"));
        assert!(merged.page_text(2).expect("p2").contains(OCR_TEXT));
    }

    #[test]
    fn fully_searchable_document_is_copied() {
        let runner = FakeRunner::new();
        let config = SiftConfig::default();
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_fixture(dir.path(), "text.pdf", &[Some("a"), Some("b")], None);
        let output = dir.path().join("ocr_text.pdf");
        let reader = PdfReader::open(&source).expect("open");

        let summary = OcrEngine::new(&runner, &config)
            .ocr_document(&reader, &source, dir.path(), &output)
            .expect("ocr");
        assert!(summary.recognised_pages.is_empty());
        assert_eq!(runner.calls_to(Tool::Ghostscript), 0);
        assert_eq!(
            std::fs::read(&source).expect("source"),
            std::fs::read(&output).expect("output")
        );
    }

    #[test]
    fn force_ocr_recognises_every_page() {
        let runner = FakeRunner::new();
        let mut config = SiftConfig::default();
        config.ocr.force_ocr = true;
        let (_dir, _output, result) = run(&runner, &config, &[Some("a"), Some("b"), None]);

        assert_eq!(result.expect("ocr").recognised_pages, vec![1, 2, 3]);
        assert_eq!(runner.calls_to(Tool::Tesseract), 3);
    }

    #[test]
    fn tools_receive_configured_language_and_resolution() {
        let runner = FakeRunner::new();
        let mut config = SiftConfig::default();
        config.ocr.dpi = 150;
        config.ocr.language = "deu".into();
        let (_dir, _output, result) = run(&runner, &config, &[None]);
        result.expect("ocr");

        let gs = &runner.args_of(Tool::Ghostscript)[0];
        assert!(gs.contains(&OsString::from("-r150")));
        assert!(gs.contains(&OsString::from("-sDEVICE=png16m")));
        assert!(gs.contains(&OsString::from("-dFirstPage=1")));

        let tesseract = &runner.args_of(Tool::Tesseract)[0];
        assert!(tesseract.contains(&OsString::from("deu")));
        assert_eq!(tesseract.last(), Some(&OsString::from("pdf")));
    }

    #[test]
    fn missing_tesseract_aborts() {
        let runner = FakeRunner::new().missing(Tool::Tesseract);
        let config = SiftConfig::default();
        let (_dir, output, result) = run(&runner, &config, &[None]);
        assert!(matches!(
            result,
            Err(SiftError::ToolMissing { tool: Tool::Tesseract, .. })
        ));
        assert!(!output.exists());
    }
}
