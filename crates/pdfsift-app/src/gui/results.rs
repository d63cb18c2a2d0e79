// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result panes for text, images, tables, and structured content.

use dioxus::prelude::*;
use pdfsift_core::types::{ArtifactKind, ELEMENT_PREVIEW, summarize_elements};

use super::state::GuiState;

#[component]
pub fn Results() -> Element {
    let state = use_context::<Signal<GuiState>>();
    let state = state.read();
    let Some(report) = state.report.as_ref() else {
        return rsx! {};
    };

    let image_names: Vec<String> = report
        .artifacts_of(ArtifactKind::Image)
        .filter_map(|a| a.path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let workbook = report
        .artifact(ArtifactKind::Spreadsheet)
        .map(|a| a.path.display().to_string());
    let elements = summarize_elements(&report.elements, ELEMENT_PREVIEW);
    let text_preview = state.text_preview.clone();
    let image_count = report.image_count;
    let table_count = report.table_count;
    let ops = report.operations;
    let ocr = report
        .artifact(ArtifactKind::OcrPdf)
        .map(|a| a.path.display().to_string());

    rsx! {
        div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 12px;",
            if ops.text {
                Pane { title: "Text",
                    if text_preview.is_empty() {
                        p { style: "color: #aaa;", "No text found." }
                    } else {
                        pre { style: "white-space: pre-wrap; max-height: 300px; overflow-y: auto; margin: 0;",
                            "{text_preview}"
                        }
                    }
                }
            }
            if ops.images {
                Pane { title: "Images",
                    p { "{image_count} image(s) extracted" }
                    ul { style: "max-height: 300px; overflow-y: auto; margin: 0;",
                        for name in image_names {
                            li { key: "{name}", "{name}" }
                        }
                    }
                }
            }
            if ops.tables {
                Pane { title: "Tables",
                    match workbook {
                        Some(path) => rsx! {
                            p { "{table_count} table(s) saved to" }
                            code { "{path}" }
                        },
                        None => rsx! {
                            p { style: "color: #aaa;", "No tables found." }
                        },
                    }
                }
            }
            if ops.structured {
                Pane { title: "Structured content",
                    pre { style: "white-space: pre-wrap; max-height: 300px; overflow-y: auto; margin: 0;",
                        "{elements}"
                    }
                }
            }
            if let Some(path) = ocr {
                Pane { title: "OCR",
                    p { "Searchable PDF saved to" }
                    code { "{path}" }
                }
            }
        }
    }
}

#[component]
fn Pane(title: &'static str, children: Element) -> Element {
    rsx! {
        section { style: "border: 1px solid #e0e0e0; border-radius: 12px; padding: 12px; background: #fafafa;",
            h3 { style: "margin: 0 0 8px 0;", "{title}" }
            {children}
        }
    }
}
