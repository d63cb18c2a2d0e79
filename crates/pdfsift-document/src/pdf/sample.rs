// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sample document — a small A4 PDF with text, two ruled tables, and a
// gradient image, for trying every extraction operation.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use pdfsift_core::error::SiftError;
use tracing::{info, instrument};

use crate::pdf::writer::{Block, PdfWriter, TableBlock};

const LOREM_IPSUM: &str = "
    Lorem ipsum dolor sit amet, consectetur adipiscing elit. Donec a diam lectus. Sed sit amet ipsum mauris.
    Maecenas congue ligula ac quam viverra nec consectetur ante hendrerit. Donec et mollis dolor.
    Praesent et diam eget libero egestas mattis sit amet vitae augue. Nam tincidunt congue enim,
    ut porta lorem lacinia consectetur. Donec ut libero sed arcu vehicula ultricies a non tortor.
    Lorem ipsum dolor sit amet, consectetur adipiscing elit. Aenean ut gravida lorem.
    Ut turpis felis, pulvinar a semper sed, adipiscing id dolor.
";

const STAFF: [[&str; 4]; 6] = [
    ["ID", "Name", "Age", "Occupation"],
    ["001", "Zhang San", "28", "Engineer"],
    ["002", "Li Si", "32", "Designer"],
    ["003", "Wang Wu", "45", "Manager"],
    ["004", "Zhao Liu", "36", "Sales"],
    ["005", "Qian Qi", "29", "Developer"],
];

const SALES: [[&str; 4]; 6] = [
    ["Quarter", "Sales (10k)", "Growth (%)", "Share (%)"],
    ["Q1 2024", "256.8", "12.5", "23.6"],
    ["Q2 2024", "312.4", "21.7", "25.8"],
    ["Q3 2024", "287.3", "-8.0", "24.2"],
    ["Q4 2024", "342.1", "19.1", "26.5"],
    ["Total", "1198.6", "11.3", "25.0"],
];

const COLUMNS_PT: [f32; 4] = [80.0, 100.0, 80.0, 100.0];

/// Generator for the bundled sample PDF.
pub struct SampleDocument;

impl SampleDocument {
    /// Colour gradient: red grows downwards, green rightwards, blue along the
    /// diagonal. A one-pixel black frame marks the edge.
    pub fn gradient_image(width: u32, height: u32) -> RgbImage {
        let mut image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (255 * y / height.max(1)) as u8,
                (255 * x / width.max(1)) as u8,
                (255 * (x + y) / (width + height).max(1)) as u8,
            ])
        });
        if width > 0 && height > 0 {
            draw_hollow_rect_mut(
                &mut image,
                Rect::at(0, 0).of_size(width, height),
                Rgb([0, 0, 0]),
            );
        }
        image
    }

    /// The document as a block flow.
    pub fn writer() -> PdfWriter {
        let table = |rows: &[[&str; 4]], bold_footer: bool| {
            Block::Table(TableBlock {
                columns: COLUMNS_PT.to_vec(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
                bold_header: true,
                bold_footer,
            })
        };

        let mut writer = PdfWriter::new("PDF Parsing Tool Sample Document");
        writer
            .push(Block::Title("PDF Parsing Tool Sample Document".into()))
            .push(Block::Spacer(20.0))
            .push(Block::Paragraph(
                "This is a sample document for testing the PDF parsing tool.".into(),
            ))
            .push(Block::Paragraph(
                "It contains different types of content including text, tables, and images."
                    .into(),
            ))
            .push(Block::Spacer(20.0))
            .push(Block::Heading("1. Text content".into()))
            .push(Block::Spacer(10.0))
            .push(Block::Paragraph(LOREM_IPSUM.into()))
            .push(Block::Spacer(20.0))
            .push(Block::Paragraph(
                "Mixed content: this paragraph checks punctuation, the digits 123 and the \
                 letters ABC survive extraction intact."
                    .into(),
            ))
            .push(Block::Spacer(20.0))
            .push(Block::Heading("2. Tables".into()))
            .push(Block::Spacer(10.0))
            .push(table(&STAFF, false))
            .push(Block::Spacer(20.0))
            .push(Block::Paragraph("Sales statistics:".into()))
            .push(Block::Spacer(10.0))
            .push(table(&SALES, true))
            .push(Block::Spacer(20.0))
            .push(Block::Heading("3. Images".into()))
            .push(Block::Spacer(10.0))
            .push(Block::Image {
                image: Self::gradient_image(400, 300),
                width_pt: 400.0,
                height_pt: 300.0,
            })
            .push(Block::Spacer(10.0))
            .push(Block::Paragraph("Figure 1: sample image - colour gradient".into()))
            .push(Block::Spacer(20.0))
            .push(Block::Paragraph(
                "This PDF contains text, tables, and images, and can be used to test every \
                 feature of the PDF parsing tool."
                    .into(),
            ))
            .push(Block::Spacer(10.0))
            .push(Block::Paragraph(
                "If you can read this sentence, the PDF was generated successfully.".into(),
            ));
        writer
    }

    /// Render the sample document to bytes.
    pub fn render() -> Result<Vec<u8>, SiftError> {
        Self::writer().render()
    }

    /// Write the sample document to `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write(path: impl AsRef<Path>) -> Result<(), SiftError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::writer().write_to_file(path)?;
        info!("Sample PDF generated: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfReader;

    #[test]
    fn gradient_has_frame_and_ramps() {
        let image = SampleDocument::gradient_image(40, 30);
        assert_eq!(image.dimensions(), (40, 30));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(39, 29), &Rgb([0, 0, 0]));
        // Inside the frame red increases with y, green with x.
        let top = image.get_pixel(20, 1);
        let bottom = image.get_pixel(20, 28);
        assert!(bottom[0] > top[0]);
        let left = image.get_pixel(1, 15);
        let right = image.get_pixel(38, 15);
        assert!(right[1] > left[1]);
    }

    #[test]
    fn sample_is_a_loadable_pdf_with_an_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("sample.pdf");
        SampleDocument::write(&path).expect("write");

        let reader = PdfReader::open(&path).expect("open");
        assert!(reader.page_count() >= 1);
        let images = reader.images().expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width, 400);
    }
}
