// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table extraction — run tabula-java, parse its JSON, and save the tables as
// an Excel workbook with one sheet per table.

use std::path::Path;

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::Tool;
use rust_xlsxwriter::Workbook;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::tools::{ToolRunner, expand_args};

/// Largest sheet Excel accepts.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// A table as rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Page the table was found on, when tabula reports it.
    pub page: Option<u32>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Parse tabula's `--format JSON` output, dropping tables with no non-empty
/// cell.
pub fn parse_tabula_json(json: &[u8]) -> Result<Vec<Table>> {
    let raw: Vec<TabulaTable> = serde_json::from_slice(json)
        .map_err(|err| SiftError::TableError(format!("unexpected tabula output: {err}")))?;

    Ok(raw
        .into_iter()
        .map(|table| Table {
            page: table.page_number,
            rows: table
                .data
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.text.trim().to_string()).collect())
                .collect(),
        })
        .filter(|table| {
            table
                .rows
                .iter()
                .any(|row: &Vec<String>| row.iter().any(|cell| !cell.is_empty()))
        })
        .collect())
}

/// Write `tables` to `path`, one worksheet per table named `Table_<n>`.
///
/// Cells that parse as finite numbers are stored as numbers so spreadsheet
/// formulas work on them.
pub fn write_workbook(tables: &[Table], path: &Path) -> Result<()> {
    let xlsx = |err: rust_xlsxwriter::XlsxError| SiftError::Spreadsheet(err.to_string());

    let mut workbook = Workbook::new();
    for (index, table) in tables.iter().enumerate() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(format!("Table_{}", index + 1)).map_err(xlsx)?;

        for (row_index, row) in table.rows.iter().take(MAX_ROWS).enumerate() {
            for (column_index, cell) in row.iter().take(MAX_COLUMNS).enumerate() {
                let (r, c) = (row_index as u32, column_index as u16);
                if cell.is_empty() {
                    continue;
                }
                match as_number(cell) {
                    Some(number) => sheet.write_number(r, c, number).map_err(xlsx)?,
                    None => sheet.write_string(r, c, cell).map_err(xlsx)?,
                };
            }
        }
    }

    workbook.save(path).map_err(xlsx)?;
    debug!(sheets = tables.len(), path = %path.display(), "Workbook saved");
    Ok(())
}

/// A cell as a number, unless it is an identifier with leading zeros ("007").
fn as_number(cell: &str) -> Option<f64> {
    let digits = cell.trim_start_matches(['-', '+']);
    if digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Runs tabula-java through `java -jar`.
pub struct TableExtractor<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a SiftConfig,
}

impl<'a> TableExtractor<'a> {
    pub fn new(runner: &'a dyn ToolRunner, config: &'a SiftConfig) -> Self {
        Self { runner, config }
    }

    /// Detect the tables in `source`.
    #[instrument(skip_all, fields(source = %source.display()))]
    pub fn detect(&self, source: &Path) -> Result<Vec<Table>> {
        let settings = &self.config.tables;
        let args = expand_args(
            &settings.args,
            &[("jar", settings.tabula_jar.as_path()), ("input", source)],
        );
        let output = self
            .runner
            .run(Tool::Tabula, self.config.tools.program(Tool::Tabula), &args)?;
        let tables = parse_tabula_json(&output.stdout)?;
        info!(tables = tables.len(), "Table detection complete");
        Ok(tables)
    }

    /// Detect tables and, if there are any, save them to `workbook`.
    ///
    /// Returns the number of tables written; no file is created for zero.
    pub fn extract(&self, source: &Path, workbook: &Path) -> Result<usize> {
        let tables = self.detect(source)?;
        if tables.is_empty() {
            info!("no tables found");
            return Ok(0);
        }
        write_workbook(&tables, workbook)?;
        Ok(tables.len())
    }
}
