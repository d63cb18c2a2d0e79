// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for pdfsift.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External programs pdfsift delegates work to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Ghostscript renders PDF pages to raster images.
    Ghostscript,
    /// Tesseract OCR engine, producing searchable PDF pages.
    Tesseract,
    /// GraphicsMagick strips and recompresses extracted images.
    GraphicsMagick,
    /// Java runtime hosting tabula-java for table extraction.
    Tabula,
    /// `unstructured-ingest` for document element partitioning.
    Unstructured,
}

impl Tool {
    /// Every tool, in the order `doctor` reports them.
    pub const ALL: [Tool; 5] = [
        Tool::Ghostscript,
        Tool::Tesseract,
        Tool::GraphicsMagick,
        Tool::Tabula,
        Tool::Unstructured,
    ];

    /// Human-facing name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ghostscript => "Ghostscript",
            Self::Tesseract => "Tesseract",
            Self::GraphicsMagick => "GraphicsMagick",
            Self::Tabula => "tabula-java",
            Self::Unstructured => "unstructured-ingest",
        }
    }

    /// Arguments that make the program print its version and exit.
    pub fn version_args(&self) -> &'static [&'static str] {
        match self {
            Self::Ghostscript => &["--version"],
            Self::Tesseract => &["--version"],
            Self::GraphicsMagick => &["version"],
            Self::Tabula => &["-version"],
            Self::Unstructured => &["--version"],
        }
    }

    /// Short installation hint shown when the program cannot be found.
    pub fn install_hint(&self) -> &'static str {
        match self {
            Self::Ghostscript => "install the `ghostscript` package",
            Self::Tesseract => {
                "install `tesseract-ocr` plus the language packs you need (e.g. chi_sim, eng)"
            }
            Self::GraphicsMagick => "install the `graphicsmagick` package",
            Self::Tabula => {
                "install a Java runtime and download tabula-java, then set PDFSIFT_TABULA_JAR"
            }
            Self::Unstructured => "run `pip install unstructured-ingest \"unstructured[pdf]\"`",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of operations requested for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operations {
    pub ocr: bool,
    pub text: bool,
    pub images: bool,
    pub tables: bool,
    pub structured: bool,
}

impl Operations {
    /// Every operation enabled.
    pub fn all() -> Self {
        Self {
            ocr: true,
            text: true,
            images: true,
            tables: true,
            structured: true,
        }
    }

    /// Whether no operation was selected.
    pub fn is_empty(&self) -> bool {
        !(self.ocr || self.text || self.images || self.tables || self.structured)
    }

    /// The stages this selection will run, in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if self.ocr {
            stages.push(Stage::Ocr);
        }
        if self.text {
            stages.push(Stage::Text);
        }
        if self.images {
            stages.push(Stage::Images);
        }
        if self.tables {
            stages.push(Stage::Tables);
        }
        if self.structured {
            stages.push(Stage::Structured);
        }
        stages
    }
}

/// Options for a full processing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessOptions {
    pub operations: Operations,
    /// Keep the temporary workspace instead of deleting it afterwards.
    pub keep_temp: bool,
}

/// Pipeline stages, used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Ocr,
    Text,
    Images,
    Tables,
    Structured,
    Done,
}

impl Stage {
    /// Progress percentage reported when the stage starts.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Ocr => 10,
            Self::Text => 30,
            Self::Images => 50,
            Self::Tables => 70,
            Self::Structured => 90,
            Self::Done => 100,
        }
    }

    /// Status line shown while the stage runs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ocr => "Running OCR...",
            Self::Text => "Extracting text...",
            Self::Images => "Extracting images...",
            Self::Tables => "Extracting tables...",
            Self::Structured => "Extracting structured content...",
            Self::Done => "Processing complete",
        }
    }
}

/// A progress update emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub percent: u8,
    pub message: String,
}

impl From<Stage> for Progress {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: stage.label().to_string(),
        }
    }
}

/// Role of a structured document element, as classified by the layout tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Title,
    NarrativeText,
    ListItem,
    Table,
    Header,
    Footer,
    Image,
    FigureCaption,
    Address,
    EmailAddress,
    PageBreak,
    Formula,
    UncategorizedText,
    Other(String),
}

impl ElementKind {
    /// Map the element type label emitted by `unstructured`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Title" => Self::Title,
            "NarrativeText" => Self::NarrativeText,
            "ListItem" => Self::ListItem,
            "Table" => Self::Table,
            "Header" => Self::Header,
            "Footer" => Self::Footer,
            "Image" => Self::Image,
            "FigureCaption" => Self::FigureCaption,
            "Address" => Self::Address,
            "EmailAddress" => Self::EmailAddress,
            "PageBreak" => Self::PageBreak,
            "Formula" => Self::Formula,
            "UncategorizedText" | "Text" => Self::UncategorizedText,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Title => "Title",
            Self::NarrativeText => "NarrativeText",
            Self::ListItem => "ListItem",
            Self::Table => "Table",
            Self::Header => "Header",
            Self::Footer => "Footer",
            Self::Image => "Image",
            Self::FigureCaption => "FigureCaption",
            Self::Address => "Address",
            Self::EmailAddress => "EmailAddress",
            Self::PageBreak => "PageBreak",
            Self::Formula => "Formula",
            Self::UncategorizedText => "UncategorizedText",
            Self::Other(label) => label,
        }
    }
}

/// One classified element of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredElement {
    pub kind: ElementKind,
    pub text: String,
    pub page_number: Option<u32>,
    pub element_id: Option<String>,
}

impl std::fmt::Display for StructuredElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.text)
    }
}

/// Kind of file a run wrote to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    OcrPdf,
    Text,
    Image,
    Spreadsheet,
    StructuredJson,
}

/// A file written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: u64,
    /// SHA-256 of the file contents, hex encoded.
    pub sha256: String,
}

/// Summary of a processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub operations: Operations,
    pub artifacts: Vec<Artifact>,
    /// Characters of extracted text (0 when text extraction was not run).
    pub text_chars: usize,
    pub image_count: usize,
    pub table_count: usize,
    pub elements: Vec<StructuredElement>,
    /// Set when the temporary workspace was kept.
    pub temp_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ProcessReport {
    pub fn new(input: PathBuf, output_dir: PathBuf, operations: Operations) -> Self {
        let now = Utc::now();
        Self {
            input,
            output_dir,
            operations,
            artifacts: Vec::new(),
            text_chars: 0,
            image_count: 0,
            table_count: 0,
            elements: Vec::new(),
            temp_dir: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Artifacts of one kind.
    pub fn artifacts_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// First artifact of one kind.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts_of(kind).next()
    }
}

/// Characters kept per element by [`summarize_elements`].
const SUMMARY_TEXT_LIMIT: usize = 100;

/// Elements listed in a console or window summary.
pub const ELEMENT_PREVIEW: usize = 20;

/// Render a short listing of the first `limit` elements.
///
/// Each element is truncated to 100 characters; when more elements exist a
/// trailer line states how many were left out.
pub fn summarize_elements(elements: &[StructuredElement], limit: usize) -> String {
    let mut out = format!("{} structured elements extracted:\n\n", elements.len());
    for (i, element) in elements.iter().take(limit).enumerate() {
        let rendered = element.to_string();
        let truncated: String = rendered.chars().take(SUMMARY_TEXT_LIMIT).collect();
        let ellipsis = if rendered.chars().count() > SUMMARY_TEXT_LIMIT {
            "..."
        } else {
            ""
        };
        out.push_str(&format!("{}. {}{}\n", i + 1, truncated, ellipsis));
    }
    if elements.len() > limit {
        out.push_str(&format!(
            "\n(showing the first {} of {} elements)",
            limit,
            elements.len()
        ));
    }
    out
}
