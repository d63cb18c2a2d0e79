// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image extraction — write every embedded image XObject to disk, then shrink
// each file with GraphicsMagick.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use pdfsift_core::config::SiftConfig;
use pdfsift_core::error::Result;
use pdfsift_core::types::Tool;
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;
use crate::pdf::reader::{EmbeddedImage, PdfReader};
use crate::tools::{ToolRunner, os_args};

/// How an embedded image is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    /// Stream bytes are already a complete file.
    Passthrough(&'static str),
    /// Decoded samples re-encoded as PNG.
    Png,
}

fn encoding_for(image: &EmbeddedImage) -> Option<Encoding> {
    match image.filter.as_deref() {
        Some("DCTDecode") => Some(Encoding::Passthrough("jpg")),
        Some("JPXDecode") => Some(Encoding::Passthrough("jp2")),
        None | Some("FlateDecode" | "LZWDecode" | "ASCII85Decode") => {
            let plain = matches!(image.color_space.as_deref(), Some("DeviceRGB" | "DeviceGray"));
            (plain && image.bits_per_component == Some(8)).then_some(Encoding::Png)
        }
        Some(_) => None,
    }
}

/// Writes embedded images as `image_p<page>_<index>.<ext>`.
pub struct ImageExtractor<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a SiftConfig,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(runner: &'a dyn ToolRunner, config: &'a SiftConfig) -> Self {
        Self { runner, config }
    }

    /// Extract every supported image into `dir` (created if needed) and return
    /// the written files in page order.
    ///
    /// Images in an encoding pdfsift cannot express as a file are skipped with
    /// a warning.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn extract(&self, reader: &PdfReader, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let mut skipped = 0usize;
        for image in reader.images()? {
            let Some(encoding) = encoding_for(&image) else {
                warn!(
                    page = image.page,
                    index = image.index,
                    filter = ?image.filter,
                    color_space = ?image.color_space,
                    "unsupported image encoding, skipping"
                );
                skipped += 1;
                continue;
            };

            match write_image(&image, encoding, dir) {
                Ok(path) => {
                    if self.config.images.optimize {
                        self.optimize(&path);
                    }
                    written.push(path);
                }
                Err(err) => {
                    warn!(
                        page = image.page,
                        index = image.index,
                        %err,
                        "cannot write image, skipping"
                    );
                    skipped += 1;
                }
            }
        }

        info!(extracted = written.len(), skipped, "Image extraction complete");
        Ok(written)
    }

    /// `gm convert <f> -strip -quality <q> <f>`. Failure keeps the original.
    fn optimize(&self, path: &Path) {
        let quality = self.config.images.quality.to_string();
        let args = os_args([
            OsStr::new("convert"),
            path.as_os_str(),
            OsStr::new("-strip"),
            OsStr::new("-quality"),
            OsStr::new(&quality),
            path.as_os_str(),
        ]);
        let program = self.config.tools.program(Tool::GraphicsMagick);
        match self.runner.run(Tool::GraphicsMagick, program, &args) {
            Ok(_) => debug!(path = %path.display(), "image optimised"),
            Err(err) => warn!(path = %path.display(), %err, "image optimisation failed"),
        }
    }
}

fn write_image(image: &EmbeddedImage, encoding: Encoding, dir: &Path) -> Result<PathBuf> {
    let stem = format!("image_p{}_{}", image.page, image.index);
    match encoding {
        Encoding::Passthrough(ext) => {
            let path = dir.join(format!("{stem}.{ext}"));
            std::fs::write(&path, &image.data)?;
            Ok(path)
        }
        Encoding::Png => {
            let path = dir.join(format!("{stem}.png"));
            let processor = ImageProcessor::from_raw_samples(
                image.width,
                image.height,
                image.color_space.as_deref().unwrap_or_default(),
                image.bits_per_component.unwrap_or_default(),
                image.data.clone(),
            )?;
            processor.save(&path)?;
            Ok(path)
        }
    }
}
