// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: small PDFs built with lopdf and a fake tool runner that
// behaves like the real external programs without needing them installed.

use std::ffi::OsString;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use pdfsift_core::error::{Result, SiftError};
use pdfsift_core::types::Tool;

use crate::tools::{ToolOutput, ToolRunner};

/// Image embedded in every page of a fixture PDF.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FixtureImage {
    /// 8x6 baseline JPEG (`DCTDecode`).
    Jpeg,
    /// 8x6 8-bit DeviceRGB samples, Flate compressed.
    FlateRgb,
    /// 8x6 8-bit samples in an `[/ICCBased n 0 R]` space with `/N 3`.
    IccRgb,
    /// 8x6 JPEG additionally Flate compressed (`[/FlateDecode /DCTDecode]`).
    FlateJpeg,
}

pub(crate) const FIXTURE_PIXEL: [u8; 3] = [200, 30, 30];

fn fixture_pixels() -> image::RgbImage {
    image::RgbImage::from_pixel(8, 6, image::Rgb(FIXTURE_PIXEL))
}

pub(crate) fn fixture_jpeg() -> Vec<u8> {
    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgb8(fixture_pixels())
        .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    jpeg
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("deflate");
    encoder.finish().expect("deflate")
}

impl FixtureImage {
    fn stream(self, doc: &mut Document) -> Stream {
        match self {
            Self::Jpeg => Stream::new(image_dict(Some("DCTDecode".into())), fixture_jpeg()),
            Self::FlateRgb => {
                let mut stream = Stream::new(image_dict(None), fixture_pixels().into_raw());
                stream.compress().expect("compress");
                stream
            }
            Self::IccRgb => {
                let profile_id = doc.add_object(Stream::new(
                    dictionary! { "N" => 3, "Alternate" => "DeviceRGB" },
                    vec![0; 16],
                ));
                let mut dict = image_dict(Some("FlateDecode".into()));
                dict.set(
                    "ColorSpace",
                    vec![Object::Name(b"ICCBased".to_vec()), Object::Reference(profile_id)],
                );
                Stream::new(dict, zlib(&fixture_pixels().into_raw()))
            }
            Self::FlateJpeg => {
                let chain = vec![
                    Object::Name(b"FlateDecode".to_vec()),
                    Object::Name(b"DCTDecode".to_vec()),
                ];
                Stream::new(image_dict(Some(Object::Array(chain))), zlib(&fixture_jpeg()))
            }
        }
    }
}

fn image_dict(filter: Option<Object>) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => 8,
        "Height" => 6,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if let Some(filter) = filter {
        dict.set("Filter", filter);
    }
    dict
}

/// A PDF with one page per entry; `None` is a page without text.
///
/// Fonts, images and the media box live on the `/Pages` node, so every page
/// inherits them. Every page draws the image.
pub(crate) fn fixture_pdf(pages: &[Option<&str>], image: Option<FixtureImage>) -> Vec<u8> {
    let draws = vec![true; pages.len()];
    fixture_pdf_drawing(pages, image, &draws)
}

/// Like [`fixture_pdf`], but page `i` only paints the shared image when
/// `draws[i]` is set.
pub(crate) fn fixture_pdf_drawing(
    pages: &[Option<&str>],
    image: Option<FixtureImage>,
    draws: &[bool],
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let mut xobjects = Dictionary::new();
    if let Some(image) = image {
        let stream = image.stream(&mut doc);
        let image_id = doc.add_object(stream);
        xobjects.set("Im1", image_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });

    let mut kids = Vec::new();
    for (page_index, text) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        if let Some(text) = text {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]);
        }
        if image.is_some() && draws.get(page_index).copied().unwrap_or(false) {
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![80.into(), 0.into(), 0.into(), 60.into(), 72.into(), 500.into()],
                ),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ]);
        }
        let content = Content { operations }.encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save fixture");
    bytes
}

/// Write a fixture PDF to `dir/name` and return its path.
pub(crate) fn write_fixture(
    dir: &Path,
    name: &str,
    pages: &[Option<&str>],
    image: Option<FixtureImage>,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixture_pdf(pages, image)).expect("write fixture");
    path
}

/// Text placed on every page Tesseract "recognises".
pub(crate) const OCR_TEXT: &str = "OCR TEXT";

/// Default tabula output: two tables, the second of which has no rows.
pub(crate) const TABULA_JSON: &str = r#"[
  {"extraction_method": "lattice", "page_number": 1, "data": [
    [{"text": "ID"}, {"text": "Name"}, {"text": "Age"}],
    [{"text": "001"}, {"text": "Alice"}, {"text": "28"}],
    [{"text": "002"}, {"text": "Bob"}, {"text": "32"}]
  ]},
  {"extraction_method": "stream", "page_number": 2, "data": []}
]"#;

/// Default `unstructured-ingest` element list.
pub(crate) const ELEMENTS_JSON: &str = r#"[
  {"type": "Title", "element_id": "e1", "text": "Quarterly Report", "metadata": {"page_number": 1}},
  {"type": "NarrativeText", "element_id": "e2", "text": "Sales grew in every region.", "metadata": {"page_number": 1}},
  {"type": "ListItem", "element_id": "e3", "text": "North", "metadata": {"page_number": 2}}
]"#;

/// A [`ToolRunner`] that emulates each external program.
///
/// - `gs` writes a PNG to the `-sOutputFile=` path.
/// - `tesseract <image> <base> -l <lang> pdf` writes `<base>.pdf` with
///   [`OCR_TEXT`] on it.
/// - `gm` succeeds without touching the file.
/// - `java` (tabula) prints the configured JSON.
/// - `unstructured-ingest` writes `<output-dir>/<input name>.json`.
///
/// Version checks print `fake-<program> 5.3.0`.
pub(crate) struct FakeRunner {
    missing: Vec<Tool>,
    failing: Vec<Tool>,
    tables_json: String,
    elements_json: String,
    calls: Mutex<Vec<(Tool, Vec<OsString>)>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self {
            missing: Vec::new(),
            failing: Vec::new(),
            tables_json: TABULA_JSON.to_string(),
            elements_json: ELEMENTS_JSON.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Behave as if `tool` is not installed.
    pub(crate) fn missing(mut self, tool: Tool) -> Self {
        self.missing.push(tool);
        self
    }

    /// Make every run of `tool` exit with status 1.
    pub(crate) fn failing(mut self, tool: Tool) -> Self {
        self.failing.push(tool);
        self
    }

    pub(crate) fn with_tables(mut self, json: &str) -> Self {
        self.tables_json = json.to_string();
        self
    }

    pub(crate) fn with_elements(mut self, json: &str) -> Self {
        self.elements_json = json.to_string();
        self
    }

    /// Number of times `tool` was run (version checks included).
    pub(crate) fn calls_to(&self, tool: Tool) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|(called, _)| *called == tool)
            .count()
    }

    /// Arguments of every run of `tool`, in order.
    pub(crate) fn args_of(&self, tool: Tool) -> Vec<Vec<OsString>> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|(called, _)| *called == tool)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

fn value_after<'a>(args: &'a [OsString], flag: &str) -> Option<&'a OsString> {
    args.iter().position(|arg| arg == flag).and_then(|i| args.get(i + 1))
}

impl ToolRunner for FakeRunner {
    fn run(&self, tool: Tool, program: &str, args: &[OsString]) -> Result<ToolOutput> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((tool, args.to_vec()));

        if self.missing.contains(&tool) {
            return Err(SiftError::ToolMissing {
                tool,
                program: program.to_string(),
            });
        }
        if self.failing.contains(&tool) {
            return Err(SiftError::ToolFailed {
                tool,
                status: "exit status: 1".into(),
                stderr: format!("{program}: simulated failure"),
            });
        }

        let is_version = args.len() == tool.version_args().len()
            && args.iter().zip(tool.version_args()).all(|(a, b)| a == b);
        if is_version {
            let banner = format!("fake-{program} 5.3.0\n").into_bytes();
            // Java prints its banner on stderr.
            return Ok(if tool == Tool::Tabula {
                ToolOutput {
                    stdout: Vec::new(),
                    stderr: banner,
                }
            } else {
                ToolOutput {
                    stdout: banner,
                    stderr: Vec::new(),
                }
            });
        }

        match tool {
            Tool::Ghostscript => {
                let target = args
                    .iter()
                    .find_map(|arg| arg.to_str()?.strip_prefix("-sOutputFile="))
                    .expect("gs called without -sOutputFile");
                image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]))
                    .save(target)
                    .expect("write page png");
                Ok(ToolOutput::default())
            }
            Tool::Tesseract => {
                let base = args.get(1).expect("tesseract output base");
                let mut target = base.clone();
                target.push(".pdf");
                std::fs::write(&target, fixture_pdf(&[Some(OCR_TEXT)], None))?;
                Ok(ToolOutput::default())
            }
            Tool::GraphicsMagick => Ok(ToolOutput::default()),
            Tool::Tabula => Ok(ToolOutput {
                stdout: self.tables_json.clone().into_bytes(),
                stderr: Vec::new(),
            }),
            Tool::Unstructured => {
                let input = value_after(args, "--input-path").expect("--input-path");
                let output = value_after(args, "--output-dir").expect("--output-dir");
                std::fs::create_dir_all(output)?;
                let name = Path::new(input)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "input".into());
                std::fs::write(
                    Path::new(output).join(format!("{name}.json")),
                    &self.elements_json,
                )?;
                Ok(ToolOutput::default())
            }
        }
    }
}
