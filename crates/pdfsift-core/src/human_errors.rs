// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the CLI and the desktop window.
//
// Every technical error is mapped to a plain sentence with a clear suggestion.
// Severity drives how the UI presents it.

use crate::error::SiftError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary condition; running again may succeed.
    Transient,
    /// The user must do something (install a tool, pick another file).
    ActionRequired,
    /// Retrying will not help with this input.
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `SiftError` into a `HumanError`.
pub fn humanize_error(err: &SiftError) -> HumanError {
    match err {
        // -- Input --
        SiftError::InputNotFound(path) => HumanError {
            message: "The input file couldn't be found.".into(),
            suggestion: format!("Check the path and try again. ({})", path.display()),
            severity: Severity::ActionRequired,
        },

        SiftError::NotAPdf(path) => HumanError {
            message: "That file isn't a PDF.".into(),
            suggestion: format!(
                "Choose a file that starts with a PDF header. ({})",
                path.display()
            ),
            severity: Severity::Permanent,
        },

        // -- Document --
        SiftError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or encrypted. Try opening it in a PDF viewer first, or try a different file.".into(),
            severity: Severity::Permanent,
        },

        SiftError::ImageError(_) => HumanError {
            message: "An embedded image couldn't be decoded.".into(),
            suggestion: "The image may use an unusual encoding. The other extracted images are still usable.".into(),
            severity: Severity::Permanent,
        },

        SiftError::OcrError(_) => HumanError {
            message: "Text recognition didn't work on this document.".into(),
            suggestion: "Check that the Tesseract language packs in the OCR settings are installed.".into(),
            severity: Severity::ActionRequired,
        },

        SiftError::TableError(_) => HumanError {
            message: "Table extraction failed.".into(),
            suggestion: "Check that tabula-java runs on its own against this file.".into(),
            severity: Severity::ActionRequired,
        },

        SiftError::StructuredError(_) => HumanError {
            message: "Structured content extraction failed.".into(),
            suggestion: "Check that `unstructured-ingest` runs on its own against this file.".into(),
            severity: Severity::ActionRequired,
        },

        SiftError::Spreadsheet(_) => HumanError {
            message: "The tables couldn't be saved as a spreadsheet.".into(),
            suggestion: "Make sure the output directory is writable and has free space.".into(),
            severity: Severity::Transient,
        },

        // -- Tools --
        SiftError::ToolMissing { tool, program } => HumanError {
            message: format!("{tool} isn't installed."),
            suggestion: format!(
                "pdfsift looked for `{program}`. To fix this, {}. Run `pdfsift doctor` to check all tools.",
                tool.install_hint()
            ),
            severity: Severity::ActionRequired,
        },

        SiftError::ToolFailed { tool, stderr, .. } => {
            let detail = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("no output");
            HumanError {
                message: format!("{tool} reported an error."),
                suggestion: format!("Run with --verbose for details. ({detail})"),
                severity: Severity::Permanent,
            }
        }

        // -- Configuration / persistence --
        SiftError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix or remove the config file and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        SiftError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied while reading or writing a file.".into(),
                    suggestion: "Check the permissions of the input file and the output directory.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        SiftError::Serialization(_) => HumanError {
            message: "A tool produced output pdfsift couldn't understand.".into(),
            suggestion: "The installed tool version may be unsupported. Run with --verbose for details.".into(),
            severity: Severity::Permanent,
        },
    }
}
