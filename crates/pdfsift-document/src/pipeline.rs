// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing pipeline — run the requested operations in fixed order, copy
// their results into the output directory, and clean up the workspace.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::Result;
use pdfsift_core::types::{
    ArtifactKind, Operations, ProcessOptions, ProcessReport, Progress, Stage,
};
use tracing::{error, info, instrument, warn};

use crate::integrity::artifact;
use crate::parser::PdfParser;
use crate::structured::save_elements;
use crate::tools::{SystemRunner, ToolRunner};

/// Name of the text artifact.
pub const TEXT_FILE: &str = "extracted_text.txt";
/// Directory of image artifacts inside the output directory.
pub const IMAGES_DIR: &str = "images";

/// Runs whole-document processing jobs.
pub struct Processor {
    config: SiftConfig,
    runner: Arc<dyn ToolRunner>,
}

impl Processor {
    pub fn new(config: SiftConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    pub fn with_runner(config: SiftConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self { config, runner }
    }

    /// Process `input` into `output_dir`.
    ///
    /// An empty operation set means every operation. The first failing
    /// operation aborts the run; the workspace is removed either way unless
    /// `keep_temp` is set.
    #[instrument(skip_all, fields(input = %input.display(), output = %output_dir.display()))]
    pub fn run(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &ProcessOptions,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<ProcessReport> {
        let operations = if options.operations.is_empty() {
            Operations::all()
        } else {
            options.operations
        };

        let parser =
            PdfParser::with_runner(input, self.config.clone(), Arc::clone(&self.runner))?;
        std::fs::create_dir_all(output_dir)?;

        let mut report =
            ProcessReport::new(input.to_path_buf(), output_dir.to_path_buf(), operations);
        let outcome = operations
            .stages()
            .into_iter()
            .try_for_each(|stage| {
                progress(Progress::from(stage));
                run_stage(&parser, stage, output_dir, &mut report)
            });

        if options.keep_temp {
            report.temp_dir = Some(parser.keep_temp());
        } else if let Err(err) = parser.cleanup() {
            warn!(%err, "could not remove workspace");
        }

        if let Err(err) = outcome {
            error!(%err, "processing failed");
            return Err(err);
        }

        report.finished_at = Utc::now();
        progress(Progress::from(Stage::Done));
        info!(
            artifacts = report.artifacts.len(),
            output = %output_dir.display(),
            "All processing complete"
        );
        Ok(report)
    }
}

fn run_stage(
    parser: &PdfParser,
    stage: Stage,
    output_dir: &Path,
    report: &mut ProcessReport,
) -> Result<()> {
    match stage {
        Stage::Ocr => {
            let ocr = parser.perform_ocr()?;
            let target = output_dir.join(format!("ocr_{}", parser.file_name()));
            std::fs::copy(&ocr, &target)?;
            info!(path = %target.display(), "OCR output saved");
            report.artifacts.push(artifact(ArtifactKind::OcrPdf, &target)?);
        }
        Stage::Text => {
            let text = parser.extract_text()?;
            report.text_chars = text.chars().count();
            if text.trim().is_empty() {
                warn!("no text extracted; {} not written", TEXT_FILE);
            } else {
                let target = output_dir.join(TEXT_FILE);
                std::fs::write(&target, &text)?;
                info!(path = %target.display(), "Text saved");
                report.artifacts.push(artifact(ArtifactKind::Text, &target)?);
            }
        }
        Stage::Images => {
            let images = parser.extract_images()?;
            report.image_count = images.len();
            if !images.is_empty() {
                let images_dir = output_dir.join(IMAGES_DIR);
                std::fs::create_dir_all(&images_dir)?;
                for image in images {
                    let Some(name) = image.file_name() else {
                        continue;
                    };
                    let target = images_dir.join(name);
                    std::fs::copy(&image, &target)?;
                    report.artifacts.push(artifact(ArtifactKind::Image, &target)?);
                }
                info!(path = %images_dir.display(), count = report.image_count, "Images saved");
            }
        }
        Stage::Tables => {
            if let Some(tables) = parser.extract_tables()? {
                let target = output_dir.join(format!("tables_{}.xlsx", parser.file_stem()));
                std::fs::copy(&tables.workbook, &target)?;
                report.table_count = tables.count;
                info!(path = %target.display(), tables = tables.count, "Tables saved");
                report.artifacts.push(artifact(ArtifactKind::Spreadsheet, &target)?);
            }
        }
        Stage::Structured => {
            let elements = parser.extract_structured_content()?;
            let target = output_dir.join(format!("structured_{}.json", parser.file_stem()));
            save_elements(&elements, &target)?;
            info!(path = %target.display(), elements = elements.len(), "Structured content saved");
            report.artifacts.push(artifact(ArtifactKind::StructuredJson, &target)?);
            report.elements = elements;
        }
        Stage::Done => {}
    }
    Ok(())
}
