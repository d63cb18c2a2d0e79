// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdfsift.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Tool;

/// Top-level error type for all pdfsift operations.
#[derive(Debug, Error)]
pub enum SiftError {
    // -- Input errors --
    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("not a PDF file: {}", .0.display())]
    NotAPdf(PathBuf),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("table extraction failed: {0}")]
    TableError(String),

    #[error("structured content extraction failed: {0}")]
    StructuredError(String),

    #[error("spreadsheet write failed: {0}")]
    Spreadsheet(String),

    // -- External tools --
    #[error("{tool} is not installed or not on PATH (looked for `{program}`)")]
    ToolMissing { tool: Tool, program: String },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: Tool,
        status: String,
        stderr: String,
    },

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiftError>;
