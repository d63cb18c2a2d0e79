// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — turn raw PDF image samples into encoded files using the
// `image` crate.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use pdfsift_core::error::SiftError;
use tracing::{debug, instrument};

/// A decoded in-memory image ready to be written out.
///
/// ```ignore
/// ImageProcessor::from_raw_samples(640, 480, "DeviceRGB", 8, samples)?
///     .save("image_p1_1.png")?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Build an image from uncompressed PDF samples.
    ///
    /// Only 8-bit `DeviceRGB` and `DeviceGray` are understood; anything else
    /// (indexed, CMYK, 1-bit masks) is an [`SiftError::ImageError`].
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_raw_samples(
        width: u32,
        height: u32,
        color_space: &str,
        bits_per_component: u8,
        mut data: Vec<u8>,
    ) -> Result<Self, SiftError> {
        if bits_per_component != 8 {
            return Err(SiftError::ImageError(format!(
                "unsupported bit depth {} ({}x{} {})",
                bits_per_component, width, height, color_space
            )));
        }

        // Decoders may pad the last row; only width x height samples belong to the image.
        let channels = if color_space == "DeviceGray" { 1 } else { 3 };
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels));
        if let Some(expected) = expected {
            data.truncate(expected);
        }

        let image = match color_space {
            "DeviceRGB" => RgbImage::from_raw(width, height, data)
                .map(DynamicImage::ImageRgb8),
            "DeviceGray" => GrayImage::from_raw(width, height, data)
                .map(DynamicImage::ImageLuma8),
            other => {
                return Err(SiftError::ImageError(format!(
                    "unsupported colour space {}",
                    other
                )));
            }
        }
        .ok_or_else(|| {
            SiftError::ImageError(format!(
                "sample data too short for {}x{} {}",
                width, height, color_space
            ))
        })?;

        debug!(width, height, color_space, "Image built from raw samples");
        Ok(Self { image })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, SiftError> {
        let img = image::load_from_memory(data)
            .map_err(|err| SiftError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SiftError> {
        self.image.save(path.as_ref()).map_err(|err| {
            SiftError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}
