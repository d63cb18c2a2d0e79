// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfsift-document — Document processing for pdfsift.
//
// Provides PDF reading and page assembly (lopdf), sample document generation
// (printpdf), raw image re-encoding (image), and the extraction operations
// that drive external tools: OCR (Ghostscript + Tesseract), image
// optimisation (GraphicsMagick), tables (tabula-java), and structured content
// (unstructured-ingest).

pub mod image;
pub mod images;
pub mod integrity;
pub mod ocr;
pub mod parser;
pub mod pdf;
pub mod pipeline;
pub mod structured;
pub mod tables;
pub mod tools;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the primary structs so callers can use `pdfsift_document::Processor` etc.
pub use image::processor::ImageProcessor;
pub use parser::{PdfParser, TableOutput};
pub use pdf::reader::PdfReader;
pub use pdf::sample::SampleDocument;
pub use pdf::writer::PdfWriter;
pub use pipeline::Processor;
pub use tools::{SystemRunner, ToolOutput, ToolRunner, ToolStatus, check_tool};
