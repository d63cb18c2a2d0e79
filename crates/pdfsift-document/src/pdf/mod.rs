// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading and page assembly via lopdf, document generation via
// printpdf.

pub mod reader;
pub mod sample;
pub mod writer;

pub use reader::{EmbeddedImage, PdfReader, assemble_pages};
pub use sample::SampleDocument;
pub use writer::{Block, PdfWriter, TableBlock};
