// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfsift — OCR and content extraction for PDFs
//
// Entry point. Parses the command line, initialises logging, loads the
// configuration, and dispatches to a subcommand or the desktop window.

mod commands;
#[cfg(feature = "gui")]
mod gui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pdfsift_core::config::SiftConfig;
use pdfsift_core::types::{Operations, ProcessOptions};

/// Exit status for a failed run.
const EXIT_FAILURE: u8 = 1;
/// Exit status for a usage error.
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "pdfsift")]
#[command(version)]
#[command(about = "OCR, text, image, table and structured-content extraction for PDFs", long_about = None)]
struct Cli {
    /// Configuration file (JSON). Defaults to ~/.config/pdfsift/config.json
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process a PDF and write the results to an output directory
    Process(ProcessArgs),

    /// Generate a sample PDF with text, tables and an image
    Sample {
        /// Where to write the sample
        #[arg(short, long, value_name = "FILE", default_value = "sample.pdf")]
        output: PathBuf,
    },

    /// Check that the external tools are installed
    Doctor,

    /// Open the desktop window (the default)
    Gui,
}

#[derive(Debug, Args)]
struct ProcessArgs {
    /// Input PDF file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output directory (defaults to `default_output_dir` from the config)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Run OCR and save a searchable PDF
    #[arg(long)]
    ocr: bool,

    /// Extract the text layer
    #[arg(long)]
    extract_text: bool,

    /// Extract embedded images
    #[arg(long)]
    extract_images: bool,

    /// Extract tables into an Excel workbook
    #[arg(long)]
    extract_tables: bool,

    /// Extract classified document elements
    #[arg(long)]
    extract_structured: bool,

    /// Run every operation (also the behaviour when no operation is chosen)
    #[arg(long)]
    extract_all: bool,

    /// Keep the temporary workspace and print its location
    #[arg(long)]
    keep_temp: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl ProcessArgs {
    fn options(&self) -> ProcessOptions {
        let operations = if self.extract_all {
            Operations::all()
        } else {
            Operations {
                ocr: self.ocr,
                text: self.extract_text,
                images: self.extract_images,
                tables: self.extract_tables,
                structured: self.extract_structured,
            }
        };
        ProcessOptions {
            operations,
            keep_temp: self.keep_temp,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match SiftConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            commands::report_error(&err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    tracing::debug!(command = ?cli.command, "pdfsift starting");

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Process(args) => {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| config.default_output_dir.clone());
            let options = args.options();
            match commands::process(config, &args.input, &output, &options, args.json) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    commands::report_error(&err);
                    ExitCode::from(EXIT_FAILURE)
                }
            }
        }
        Commands::Sample { output } => match commands::sample(&output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                commands::report_error(&err);
                ExitCode::from(EXIT_FAILURE)
            }
        },
        Commands::Doctor => {
            if commands::doctor(&config) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
        Commands::Gui => launch_gui(config),
    }
}

#[cfg(feature = "gui")]
fn launch_gui(config: SiftConfig) -> ExitCode {
    tracing::info!("opening desktop window");
    gui::launch(config);
    ExitCode::SUCCESS
}

#[cfg(not(feature = "gui"))]
fn launch_gui(_config: SiftConfig) -> ExitCode {
    use clap::CommandFactory;

    eprintln!("error: this build of pdfsift has no desktop window (rebuild with `--features gui`)\n");
    let _ = Cli::command().print_help();
    ExitCode::from(EXIT_USAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn process_args(argv: &[&str]) -> ProcessArgs {
        let mut full = vec!["pdfsift", "process"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).expect("parse").command {
            Some(Commands::Process(args)) => args,
            other => panic!("expected process, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["pdfsift"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn no_operation_flags_leave_the_selection_empty() {
        let args = process_args(&["-i", "in.pdf"]);
        let options = args.options();
        assert!(options.operations.is_empty());
        assert!(!options.keep_temp);
        assert_eq!(args.output, None);
    }

    #[test]
    fn operation_flags_map_onto_operations() {
        let args = process_args(&[
            "--input",
            "in.pdf",
            "-o",
            "out",
            "--ocr",
            "--extract-tables",
            "--keep-temp",
        ]);
        let options = args.options();
        assert_eq!(
            options.operations,
            Operations {
                ocr: true,
                tables: true,
                ..Operations::default()
            }
        );
        assert!(options.keep_temp);
        assert_eq!(args.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn extract_all_selects_everything() {
        let options = process_args(&["-i", "in.pdf", "--extract-all", "--extract-text"]).options();
        assert_eq!(options.operations, Operations::all());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "pdfsift", "process", "-i", "a.pdf", "-v", "--config", "cfg.json", "--json",
        ])
        .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
    }

    #[test]
    fn process_requires_an_input() {
        let err = Cli::try_parse_from(["pdfsift", "process"]).expect_err("missing input");
        assert_eq!(err.exit_code(), i32::from(EXIT_USAGE));
    }

    #[test]
    fn sample_defaults_to_sample_pdf() {
        match Cli::try_parse_from(["pdfsift", "sample"]).expect("parse").command {
            Some(Commands::Sample { output }) => assert_eq!(output, PathBuf::from("sample.pdf")),
            other => panic!("expected sample, got {other:?}"),
        }
    }
}
