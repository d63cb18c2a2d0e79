// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window state — what the user picked, how far the run is, and what it made.

use std::path::PathBuf;

use pdfsift_core::error::SiftError;
use pdfsift_core::human_errors::{HumanError, humanize_error};
use pdfsift_core::types::{ArtifactKind, ProcessOptions, ProcessReport, Progress};

/// Characters of extracted text shown in the text pane.
const TEXT_PREVIEW_LIMIT: usize = 20_000;

/// Where the current run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing started yet.
    Idle,
    /// The pipeline is running on a worker thread.
    Running,
    /// The last run succeeded.
    Finished,
    /// The last run failed.
    Failed,
}

/// Shared state accessible to all panels via `use_context`.
#[derive(Debug, Clone)]
pub struct GuiState {
    pub input: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub options: ProcessOptions,
    pub phase: RunPhase,
    /// Percentage complete (0-100).
    pub percent: u8,
    pub status: String,
    pub report: Option<ProcessReport>,
    pub text_preview: String,
    pub error: Option<HumanError>,
}

impl GuiState {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            input: None,
            output_dir,
            options: ProcessOptions::default(),
            phase: RunPhase::Idle,
            percent: 0,
            status: "Choose a PDF to begin.".into(),
            report: None,
            text_preview: String::new(),
            error: None,
        }
    }

    /// Whether the Start button should be enabled.
    pub fn can_start(&self) -> bool {
        self.input.is_some() && self.phase != RunPhase::Running
    }

    /// Reset the result panes for a new run.
    pub fn begin(&mut self) {
        self.phase = RunPhase::Running;
        self.percent = 0;
        self.status = "Starting...".into();
        self.report = None;
        self.text_preview.clear();
        self.error = None;
    }

    pub fn apply(&mut self, progress: &Progress) {
        self.percent = progress.percent;
        self.status = progress.message.clone();
    }

    pub fn finish(&mut self, outcome: Result<(ProcessReport, String), SiftError>) {
        match outcome {
            Ok((report, text_preview)) => {
                self.phase = RunPhase::Finished;
                self.percent = 100;
                self.status = format!(
                    "Done. {} file(s) written to {}",
                    report.artifacts.len(),
                    report.output_dir.display()
                );
                self.report = Some(report);
                self.text_preview = text_preview;
            }
            Err(err) => {
                tracing::error!(%err, "processing failed");
                let human = humanize_error(&err);
                self.phase = RunPhase::Failed;
                self.status = human.message.clone();
                self.error = Some(human);
            }
        }
    }
}

/// The start of the extracted text file, for display.
pub fn load_text_preview(report: &ProcessReport) -> String {
    let Some(artifact) = report.artifact(ArtifactKind::Text) else {
        return String::new();
    };
    match std::fs::read_to_string(&artifact.path) {
        Ok(text) if text.chars().count() > TEXT_PREVIEW_LIMIT => {
            let mut preview: String = text.chars().take(TEXT_PREVIEW_LIMIT).collect();
            preview.push_str("\n...");
            preview
        }
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, path = %artifact.path.display(), "cannot read text for preview");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsift_core::types::{Artifact, Operations, Stage};

    fn report_with_text(path: PathBuf) -> ProcessReport {
        let mut report = ProcessReport::new(
            PathBuf::from("in.pdf"),
            PathBuf::from("out"),
            Operations::all(),
        );
        report.artifacts.push(Artifact {
            kind: ArtifactKind::Text,
            path,
            bytes: 0,
            sha256: String::new(),
        });
        report
    }

    #[test]
    fn start_needs_an_input_and_no_running_job() {
        let mut state = GuiState::new(PathBuf::from("pdf_output"));
        assert!(!state.can_start());
        state.input = Some(PathBuf::from("in.pdf"));
        assert!(state.can_start());
        state.begin();
        assert!(!state.can_start());
    }

    #[test]
    fn progress_and_outcome_update_the_status() {
        let mut state = GuiState::new(PathBuf::from("out"));
        state.begin();
        state.apply(&Progress::from(Stage::Tables));
        assert_eq!(state.percent, 70);
        assert_eq!(state.status, "Extracting tables...");

        state.finish(Err(SiftError::NotAPdf(PathBuf::from("notes.txt"))));
        assert_eq!(state.phase, RunPhase::Failed);
        assert!(state.error.is_some());

        state.begin();
        assert!(state.error.is_none());
        let report = ProcessReport::new(
            PathBuf::from("in.pdf"),
            PathBuf::from("out"),
            Operations::all(),
        );
        state.finish(Ok((report, "hello".into())));
        assert_eq!(state.phase, RunPhase::Finished);
        assert_eq!(state.percent, 100);
        assert_eq!(state.text_preview, "hello");
    }

    #[test]
    fn text_preview_is_truncated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("extracted_text.txt");
        std::fs::write(&path, "x".repeat(TEXT_PREVIEW_LIMIT + 10)).expect("write");
        let preview = load_text_preview(&report_with_text(path));
        assert!(preview.ends_with("\n..."));
        assert_eq!(preview.chars().count(), TEXT_PREVIEW_LIMIT + 4);
    }

    #[test]
    fn no_text_artifact_means_empty_preview() {
        let report = ProcessReport::new(
            PathBuf::from("in.pdf"),
            PathBuf::from("out"),
            Operations::all(),
        );
        assert!(load_text_preview(&report).is_empty());
    }
}
