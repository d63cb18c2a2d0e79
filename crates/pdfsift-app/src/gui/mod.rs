// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop window — pick a PDF and an output folder, choose operations, and
// watch the pipeline run on a worker thread.

mod results;
mod state;

use std::path::Path;

use dioxus::prelude::*;
use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::human_errors::Severity;
use pdfsift_core::types::{Operations, ProcessReport, Progress};
use pdfsift_document::Processor;

use results::Results;
use state::{GuiState, RunPhase, load_text_preview};

/// Open the window. Blocks until it is closed.
pub fn launch(config: SiftConfig) {
    dioxus::LaunchBuilder::new().with_context(config).launch(App);
}

/// Root component.
#[component]
fn App() -> Element {
    let config = use_context::<SiftConfig>();
    let output_dir = config.default_output_dir.clone();
    use_context_provider(|| Signal::new(GuiState::new(output_dir)));

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 16px; padding: 16px; font-family: system-ui, -apple-system, sans-serif;",
            h1 { style: "margin: 0;", "pdfsift" }
            FilePickers {}
            OperationPanel {}
            RunPanel {}
            Results {}
        }
    }
}

#[component]
fn FilePickers() -> Element {
    let mut state = use_context::<Signal<GuiState>>();
    let input_label = state
        .read()
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "No file chosen".into());
    let output_label = state.read().output_dir.display().to_string();
    let running = state.read().phase == RunPhase::Running;

    rsx! {
        div { style: "display: grid; grid-template-columns: 120px 1fr auto; gap: 8px; align-items: center;",
            strong { "PDF file" }
            span { style: "color: #444; overflow: hidden; text-overflow: ellipsis;", "{input_label}" }
            button {
                style: "padding: 8px 16px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                disabled: running,
                onclick: move |_| {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("PDF", &["pdf"])
                        .pick_file()
                    {
                        tracing::info!(path = %path.display(), "input selected");
                        let mut s = state.write();
                        s.input = Some(path);
                        s.status = "Ready.".into();
                    }
                },
                "Browse..."
            }

            strong { "Output folder" }
            span { style: "color: #444; overflow: hidden; text-overflow: ellipsis;", "{output_label}" }
            button {
                style: "padding: 8px 16px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                disabled: running,
                onclick: move |_| {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        tracing::info!(dir = %dir.display(), "output folder selected");
                        state.write().output_dir = dir;
                    }
                },
                "Browse..."
            }
        }
    }
}

#[component]
fn OperationPanel() -> Element {
    let mut state = use_context::<Signal<GuiState>>();
    let ops = state.read().options.operations;
    let keep_temp = state.read().options.keep_temp;

    rsx! {
        fieldset { style: "border: 1px solid #e0e0e0; border-radius: 12px; padding: 12px;",
            legend { "Operations" }
            Toggle {
                label: "OCR (searchable PDF)",
                checked: ops.ocr,
                on_toggle: move |on| state.write().options.operations.ocr = on,
            }
            Toggle {
                label: "Extract text",
                checked: ops.text,
                on_toggle: move |on| state.write().options.operations.text = on,
            }
            Toggle {
                label: "Extract images",
                checked: ops.images,
                on_toggle: move |on| state.write().options.operations.images = on,
            }
            Toggle {
                label: "Extract tables",
                checked: ops.tables,
                on_toggle: move |on| state.write().options.operations.tables = on,
            }
            Toggle {
                label: "Extract structured content",
                checked: ops.structured,
                on_toggle: move |on| state.write().options.operations.structured = on,
            }
            hr { style: "border: none; border-top: 1px solid #eee;" }
            Toggle {
                label: "Keep temporary files",
                checked: keep_temp,
                on_toggle: move |on| state.write().options.keep_temp = on,
            }
            if ops == Operations::default() {
                p { style: "color: #888; font-size: 13px; margin: 4px 0 0 0;",
                    "Nothing selected: every operation will run."
                }
            }
        }
    }
}

#[component]
fn Toggle(label: &'static str, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        label { style: "display: flex; align-items: center; gap: 8px; padding: 4px 0;",
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt: FormEvent| on_toggle.call(evt.checked()),
            }
            "{label}"
        }
    }
}

#[component]
fn RunPanel() -> Element {
    let mut state = use_context::<Signal<GuiState>>();
    let config = use_context::<SiftConfig>();
    let snapshot = state.read().clone();
    let status_color = match (&snapshot.phase, &snapshot.error) {
        (RunPhase::Failed, Some(err)) if err.severity == Severity::Transient => "#856404",
        (RunPhase::Failed, _) => "#721c24",
        (RunPhase::Finished, _) => "#155724",
        _ => "#666",
    };
    let percent = snapshot.percent;
    let status = snapshot.status.clone();
    let suggestion = snapshot.error.as_ref().map(|err| err.suggestion.clone());

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 8px;",
            div { style: "display: flex; gap: 8px;",
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px;",
                    disabled: !snapshot.can_start(),
                    onclick: move |_| {
                        let Some(input) = state.read().input.clone() else {
                            return;
                        };
                        let output_dir = state.read().output_dir.clone();
                        let options = state.read().options.clone();
                        let config = config.clone();
                        state.write().begin();

                        spawn(async move {
                            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Progress>();
                            let worker = tokio::task::spawn_blocking(move || -> Result<(ProcessReport, String)> {
                                let processor = Processor::new(config);
                                let report = processor.run(&input, &output_dir, &options, &mut |p| {
                                    let _ = tx.send(p);
                                })?;
                                let preview = load_text_preview(&report);
                                Ok((report, preview))
                            });

                            while let Some(progress) = rx.recv().await {
                                state.write().apply(&progress);
                            }

                            let outcome = match worker.await {
                                Ok(outcome) => outcome,
                                Err(err) => Err(SiftError::Io(std::io::Error::other(format!(
                                    "processing worker stopped: {err}"
                                )))),
                            };
                            state.write().finish(outcome);
                        });
                    },
                    if snapshot.phase == RunPhase::Running { "Processing..." } else { "Start" }
                }
                button {
                    style: "padding: 12px; border-radius: 8px; border: 1px solid #007aff; color: #007aff; background: white;",
                    disabled: snapshot.phase != RunPhase::Finished,
                    onclick: move |_| {
                        let dir = state.read().output_dir.clone();
                        if let Err(err) = open_in_file_manager(&dir) {
                            tracing::warn!(%err, dir = %dir.display(), "cannot open output folder");
                            state.write().status = format!("Could not open {}: {err}", dir.display());
                        }
                    },
                    "Open output folder"
                }
            }

            progress { style: "width: 100%;", max: "100", value: "{percent}" }
            p { style: "margin: 0; color: {status_color};", "{status}" }
            if let Some(suggestion) = suggestion {
                p { style: "margin: 0; padding: 12px; background: #fff3cd; border-radius: 8px; color: #856404; font-size: 14px;",
                    "{suggestion}"
                }
            }
        }
    }
}

/// Show `dir` in the platform file manager.
fn open_in_file_manager(dir: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let program = "xdg-open";

    std::process::Command::new(program).arg(dir).spawn().map(|_| ())
}
