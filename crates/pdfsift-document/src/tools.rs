// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External tool invocation — the single seam through which Ghostscript,
// Tesseract, GraphicsMagick, tabula-java, and unstructured-ingest are run.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::Tool;
use tracing::{debug, instrument, warn};

/// Captured output of a tool that exited successfully.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs external programs.
///
/// Implementations must turn a non-zero exit into [`SiftError::ToolFailed`] and
/// a program that cannot be spawned into [`SiftError::ToolMissing`].
pub trait ToolRunner: Send + Sync {
    fn run(&self, tool: Tool, program: &str, args: &[OsString]) -> Result<ToolOutput>;
}

/// Runs tools as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    #[instrument(skip(self, args), fields(tool = %tool, program = %program))]
    fn run(&self, tool: Tool, program: &str, args: &[OsString]) -> Result<ToolOutput> {
        debug!(args = ?args, "spawning tool");

        let output = Command::new(program).args(args).output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SiftError::ToolMissing {
                    tool,
                    program: program.to_string(),
                }
            } else {
                SiftError::Io(err)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, %stderr, "tool failed");
            return Err(SiftError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr,
            });
        }

        debug!(
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "tool finished"
        );
        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Result of probing one tool for `doctor`.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    pub program: String,
    /// First non-empty line of the version output, when the tool ran.
    pub version: Option<String>,
    pub error: Option<String>,
}

impl ToolStatus {
    pub fn available(&self) -> bool {
        self.version.is_some()
    }
}

/// Run `tool`'s version command and report whether it works.
pub fn check_tool(runner: &dyn ToolRunner, tool: Tool, program: &str) -> ToolStatus {
    let args: Vec<OsString> = tool.version_args().iter().map(OsString::from).collect();
    match runner.run(tool, program, &args) {
        Ok(output) => {
            // Java prints its version banner on stderr.
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            let version = String::from_utf8_lossy(&text)
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("unknown version")
                .to_string();
            ToolStatus {
                tool,
                program: program.to_string(),
                version: Some(version),
                error: None,
            }
        }
        Err(err) => ToolStatus {
            tool,
            program: program.to_string(),
            version: None,
            error: Some(err.to_string()),
        },
    }
}

/// Expand an argument template.
///
/// Each `{name}` placeholder is replaced by the matching path. An argument that
/// is exactly one placeholder is passed through as an `OsString` so non-UTF-8
/// paths survive.
pub fn expand_args(template: &[String], vars: &[(&str, &Path)]) -> Vec<OsString> {
    template
        .iter()
        .map(|arg| {
            let whole = arg.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'));
            if let Some(name) = whole
                && let Some((_, path)) = vars.iter().find(|(var, _)| *var == name)
            {
                return path.as_os_str().to_os_string();
            }
            let mut expanded = arg.clone();
            for (name, path) in vars {
                expanded = expanded.replace(&format!("{{{name}}}"), &path.to_string_lossy());
            }
            OsString::from(expanded)
        })
        .collect()
}

/// Convenience for building argument vectors from mixed strings and paths.
pub(crate) fn os_args<I, S>(items: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    items.into_iter().map(|s| s.as_ref().to_os_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeRunner;
    use std::path::PathBuf;

    #[test]
    fn expands_whole_and_embedded_placeholders() {
        let template = vec![
            "-jar".to_string(),
            "{jar}".to_string(),
            "--out={output}/x".to_string(),
            "{input}".to_string(),
        ];
        let jar = PathBuf::from("/opt/tabula.jar");
        let input = PathBuf::from("/docs/a b.pdf");
        let output = PathBuf::from("/tmp/out");
        let args = expand_args(
            &template,
            &[("jar", &jar), ("input", &input), ("output", &output)],
        );
        assert_eq!(
            args,
            vec![
                OsString::from("-jar"),
                OsString::from("/opt/tabula.jar"),
                OsString::from("--out=/tmp/out/x"),
                OsString::from("/docs/a b.pdf"),
            ]
        );
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let args = expand_args(&["{nope}".to_string()], &[]);
        assert_eq!(args, vec![OsString::from("{nope}")]);
    }

    #[test]
    fn missing_program_maps_to_tool_missing() {
        let err = SystemRunner
            .run(
                Tool::Tesseract,
                "pdfsift-definitely-not-a-real-program",
                &[],
            )
            .expect_err("spawn should fail");
        assert!(matches!(err, SiftError::ToolMissing { tool: Tool::Tesseract, .. }));
    }

    #[test]
    fn check_tool_reports_first_version_line() {
        let runner = FakeRunner::new();
        let status = check_tool(&runner, Tool::Tesseract, "tesseract");
        assert!(status.available());
        assert_eq!(status.version.as_deref(), Some("fake-tesseract 5.3.0"));

        let runner = FakeRunner::new().missing(Tool::Ghostscript);
        let status = check_tool(&runner, Tool::Ghostscript, "gs");
        assert!(!status.available());
        assert!(status.error.is_some());
    }
}
