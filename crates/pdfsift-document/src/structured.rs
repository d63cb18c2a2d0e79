// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured content — partition the document into classified elements with
// `unstructured-ingest` and read back the JSON it writes.

use std::path::{Path, PathBuf};

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::{ElementKind, StructuredElement, Tool};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::tools::{ToolRunner, expand_args};

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    element_id: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    page_number: Option<u32>,
}

impl From<RawElement> for StructuredElement {
    fn from(raw: RawElement) -> Self {
        Self {
            kind: ElementKind::from_label(&raw.kind),
            text: raw.text,
            page_number: raw.metadata.page_number,
            element_id: raw.element_id,
        }
    }
}

/// Parse one element file written by `unstructured-ingest`.
pub fn parse_elements(json: &[u8]) -> Result<Vec<StructuredElement>> {
    let raw: Vec<RawElement> = serde_json::from_slice(json).map_err(|err| {
        SiftError::StructuredError(format!("unexpected unstructured output: {err}"))
    })?;
    Ok(raw.into_iter().map(StructuredElement::from).collect())
}

/// Save elements as pretty-printed JSON.
pub fn save_elements(elements: &[StructuredElement], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(elements)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Every `.json` file under `dir`, sorted by path.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Runs `unstructured-ingest` in local mode.
pub struct StructuredExtractor<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a SiftConfig,
}

impl<'a> StructuredExtractor<'a> {
    pub fn new(runner: &'a dyn ToolRunner, config: &'a SiftConfig) -> Self {
        Self { runner, config }
    }

    /// Partition `source`, writing the tool's output under `work_dir`.
    #[instrument(skip_all, fields(source = %source.display()))]
    pub fn extract(&self, source: &Path, work_dir: &Path) -> Result<Vec<StructuredElement>> {
        let output_dir = work_dir.join("structured");
        std::fs::create_dir_all(&output_dir)?;

        let args = expand_args(
            &self.config.structured.args,
            &[("input", source), ("output", output_dir.as_path())],
        );
        self.runner.run(
            Tool::Unstructured,
            self.config.tools.program(Tool::Unstructured),
            &args,
        )?;

        let files = json_files(&output_dir)?;
        if files.is_empty() {
            return Err(SiftError::StructuredError(format!(
                "unstructured-ingest wrote no JSON to {}",
                output_dir.display()
            )));
        }

        let mut elements = Vec::new();
        for file in &files {
            let parsed = parse_elements(&std::fs::read(file)?)?;
            debug!(file = %file.display(), elements = parsed.len(), "element file read");
            elements.extend(parsed);
        }

        info!(elements = elements.len(), "Structured extraction complete");
        Ok(elements)
    }
}
