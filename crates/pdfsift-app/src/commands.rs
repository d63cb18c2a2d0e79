// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommands — process, sample, doctor.

use std::fmt::Write as _;
use std::path::Path;

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::human_errors::humanize_error;
use pdfsift_core::types::{
    ArtifactKind, ELEMENT_PREVIEW, ProcessOptions, ProcessReport, Tool, summarize_elements,
};
use indicatif::{ProgressBar, ProgressStyle};
use pdfsift_document::{
    Processor, SampleDocument, SystemRunner, ToolRunner, ToolStatus, check_tool,
};
use tracing::{debug, info};

/// Print an error the way a user should see it.
pub fn report_error(err: &SiftError) {
    let human = humanize_error(err);
    eprintln!("Error: {}", human.message);
    eprintln!("  {}", human.suggestion);
    debug!(%err, "underlying error");
}

/// Run the pipeline on `input`, printing progress and a summary.
pub fn process(
    config: SiftConfig,
    input: &Path,
    output_dir: &Path,
    options: &ProcessOptions,
    json: bool,
) -> Result<()> {
    let bar = progress_bar(json);
    let processor = Processor::new(config);
    let outcome = processor.run(input, output_dir, options, &mut |progress| {
        bar.set_position(u64::from(progress.percent));
        bar.set_message(progress.message);
    });
    bar.finish_and_clear();
    let report = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_summary(&report));
    }
    Ok(())
}

/// Percent bar on stderr; hidden when the report goes to stdout as JSON.
fn progress_bar(json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}");
    match style {
        Ok(style) => bar.set_style(style.progress_chars("#>-")),
        Err(err) => debug!(%err, "progress template rejected, using the default bar"),
    }
    bar
}

/// Human-readable summary of a finished run.
pub fn format_summary(report: &ProcessReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);

    if let Some(ocr) = report.artifact(ArtifactKind::OcrPdf) {
        let _ = writeln!(out, "OCR output:        {}", ocr.path.display());
    }
    if report.operations.text {
        match report.artifact(ArtifactKind::Text) {
            Some(text) => {
                let _ = writeln!(
                    out,
                    "Text:              {} ({} characters)",
                    text.path.display(),
                    report.text_chars
                );
            }
            None => {
                let _ = writeln!(out, "Text:              no text found");
            }
        }
    }
    if report.operations.images {
        let _ = writeln!(out, "Images:            {} extracted", report.image_count);
    }
    if report.operations.tables {
        match report.artifact(ArtifactKind::Spreadsheet) {
            Some(workbook) => {
                let _ = writeln!(
                    out,
                    "Tables:            {} saved to {}",
                    report.table_count,
                    workbook.path.display()
                );
            }
            None => {
                let _ = writeln!(out, "Tables:            none found");
            }
        }
    }
    if report.operations.structured {
        let _ = writeln!(out, "\n{}", summarize_elements(&report.elements, ELEMENT_PREVIEW));
    }
    if let Some(temp) = &report.temp_dir {
        let _ = writeln!(out, "Temporary files kept in {}", temp.display());
    }

    let elapsed = report.finished_at - report.started_at;
    let _ = writeln!(
        out,
        "\nDone in {:.1}s. Results are in {}",
        elapsed.num_milliseconds() as f64 / 1000.0,
        report.output_dir.display()
    );
    out
}

/// Write the sample document to `path`.
pub fn sample(path: &Path) -> Result<()> {
    SampleDocument::write(path)?;
    info!(path = %path.display(), "Sample PDF written");
    println!("Sample PDF written to {}", path.display());
    Ok(())
}

/// Check every external tool, print a table, and return whether all of them
/// work.
pub fn doctor(config: &SiftConfig) -> bool {
    let statuses = check_tools(&SystemRunner, config);
    print!("{}", format_statuses(&statuses));
    statuses.iter().all(ToolStatus::available)
}

fn check_tools(runner: &dyn ToolRunner, config: &SiftConfig) -> Vec<ToolStatus> {
    Tool::ALL
        .iter()
        .map(|&tool| check_tool(runner, tool, config.tools.program(tool)))
        .collect()
}

fn format_statuses(statuses: &[ToolStatus]) -> String {
    let mut out = String::new();
    for status in statuses {
        match &status.version {
            Some(version) => {
                let _ = writeln!(out, "  ok       {:<20} {}", status.tool.name(), version);
            }
            None => {
                let _ = writeln!(
                    out,
                    "  missing  {:<20} {} ({})",
                    status.tool.name(),
                    status.tool.install_hint(),
                    status.program
                );
            }
        }
    }
    let missing = statuses.iter().filter(|s| !s.available()).count();
    if missing == 0 {
        let _ = writeln!(out, "\nAll tools found.");
    } else {
        let _ = writeln!(
            out,
            "\n{missing} tool(s) missing. Operations that need them will fail."
        );
    }
    out
}
