// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a document, pull page text and embedded image XObjects out
// of it, and assemble new documents from pages of existing ones, all through
// the `lopdf` crate.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfsift_core::error::SiftError;
use tracing::{debug, info, instrument, warn};

/// Maximum depth followed when looking for inherited page resources.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Reads an existing PDF file.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

/// An image XObject found on a page.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// 1-indexed page the image is drawn on.
    pub page: u32,
    /// 1-indexed position of the image among the page's images.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Device colour space family (e.g. `DeviceRGB`). `ICCBased` and
    /// calibrated spaces are mapped by their component count.
    pub color_space: Option<String>,
    pub bits_per_component: Option<u8>,
    /// Last filter in the stream's filter chain (e.g. `DCTDecode`).
    pub filter: Option<String>,
    /// Stream bytes: a complete JPEG/JPEG 2000 file for DCT/JPX, otherwise
    /// the decoded samples.
    pub data: Vec<u8>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SiftError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            SiftError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, SiftError> {
        let document = Document::load_mem(data).map_err(|err| {
            SiftError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page numbers in document order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.document.get_pages().keys().copied().collect()
    }

    /// Borrow the underlying document (used when assembling new documents).
    pub fn document(&self) -> &Document {
        &self.document
    }

    // -- Text -----------------------------------------------------------------

    /// Text of one page (1-indexed).
    pub fn page_text(&self, page_number: u32) -> Result<String, SiftError> {
        self.document
            .extract_text(&[page_number])
            .map_err(|err| SiftError::PdfError(format!("page {}: {}", page_number, err)))
    }

    /// Whether a page already carries a text layer.
    ///
    /// A page whose text cannot be decoded is treated as having none.
    pub fn page_has_text(&self, page_number: u32) -> bool {
        match self.page_text(page_number) {
            Ok(text) => !text.trim().is_empty(),
            Err(err) => {
                debug!(page_number, %err, "text extraction failed, treating page as image-only");
                false
            }
        }
    }

    /// Text of the whole document in page order.
    #[instrument(skip(self))]
    pub fn text(&self) -> Result<String, SiftError> {
        let mut out = String::new();
        for page_number in self.page_numbers() {
            let page = self.page_text(page_number)?;
            out.push_str(&page);
            if !page.ends_with('\n') && !page.is_empty() {
                out.push('\n');
            }
        }
        debug!(chars = out.chars().count(), "Text extracted");
        Ok(out)
    }

    // -- Images ---------------------------------------------------------------

    /// Every image XObject a page draws, in the order its content stream
    /// first paints them.
    ///
    /// Resource dictionaries are often shared between pages, so an image is
    /// attributed to a page only when the page's content invokes it with `Do`.
    #[instrument(skip(self))]
    pub fn images(&self) -> Result<Vec<EmbeddedImage>, SiftError> {
        let mut images = Vec::new();

        for (page_number, page_id) in self.document.get_pages() {
            let Some(xobjects) = self.page_xobjects(page_id) else {
                continue;
            };

            let mut index = 0;
            for name in self.drawn_xobjects(page_number, page_id, xobjects) {
                let Ok(id) = xobjects.get(&name).and_then(Object::as_reference) else {
                    continue;
                };
                let Ok(Object::Stream(stream)) = self.document.get_object(id) else {
                    continue;
                };
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map(|subtype| subtype == b"Image")
                    .unwrap_or(false);
                if !is_image {
                    continue;
                }

                index += 1;
                let filter = last_filter(&stream.dict);
                let data = match image_bytes(stream, filter.as_deref()) {
                    Ok(data) => data,
                    Err(err) => {
                        warn!(
                            page_number,
                            name = %String::from_utf8_lossy(&name),
                            %err,
                            "cannot decode image stream, keeping raw bytes"
                        );
                        stream.content.clone()
                    }
                };

                images.push(EmbeddedImage {
                    page: page_number,
                    index,
                    width: dict_u32(&stream.dict, b"Width"),
                    height: dict_u32(&stream.dict, b"Height"),
                    color_space: stream
                        .dict
                        .get(b"ColorSpace")
                        .ok()
                        .and_then(|cs| self.color_space_family(cs, 0)),
                    bits_per_component: stream
                        .dict
                        .get(b"BitsPerComponent")
                        .and_then(Object::as_i64)
                        .ok()
                        .and_then(|b| u8::try_from(b).ok()),
                    filter,
                    data,
                });
            }
        }

        info!(count = images.len(), "Embedded images found");
        Ok(images)
    }

    /// XObject names the page's content invokes with `Do`, first use first.
    ///
    /// When the content cannot be decoded every XObject in the page's
    /// resources is returned instead.
    fn drawn_xobjects(
        &self,
        page_number: u32,
        page_id: ObjectId,
        xobjects: &Dictionary,
    ) -> Vec<Vec<u8>> {
        let content = match self.document.get_and_decode_page_content(page_id) {
            Ok(content) => content,
            Err(err) => {
                warn!(page_number, %err, "cannot decode page content, listing all XObjects");
                return xobjects.iter().map(|(name, _)| name.clone()).collect();
            }
        };

        let mut names: Vec<Vec<u8>> = Vec::new();
        for operation in &content.operations {
            if operation.operator != "Do" {
                continue;
            }
            let Some(Ok(name)) = operation.operands.first().map(Object::as_name) else {
                continue;
            };
            if !names.iter().any(|seen| seen.as_slice() == name) {
                names.push(name.to_vec());
            }
        }
        names
    }

    /// The device colour space family of an image colour space, resolving
    /// references and mapping `ICCBased` and CIE-based spaces by their
    /// component count.
    fn color_space_family(&self, object: &Object, depth: usize) -> Option<String> {
        if depth > MAX_PAGE_TREE_DEPTH {
            return None;
        }
        match object {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            Object::Reference(id) => {
                let resolved = self.document.get_object(*id).ok()?;
                self.color_space_family(resolved, depth + 1)
            }
            Object::Array(items) => {
                let family = items.first()?.as_name().ok()?;
                match family {
                    b"ICCBased" => {
                        let profile = match items.get(1)? {
                            Object::Reference(id) => self.document.get_object(*id).ok()?,
                            other => other,
                        };
                        let components = match profile {
                            Object::Stream(stream) => {
                                stream.dict.get(b"N").and_then(Object::as_i64).ok()
                            }
                            Object::Dictionary(dict) => {
                                dict.get(b"N").and_then(Object::as_i64).ok()
                            }
                            _ => None,
                        };
                        match components {
                            Some(1) => Some("DeviceGray".into()),
                            Some(3) => Some("DeviceRGB".into()),
                            Some(4) => Some("DeviceCMYK".into()),
                            _ => Some("ICCBased".into()),
                        }
                    }
                    b"CalRGB" => Some("DeviceRGB".into()),
                    b"CalGray" => Some("DeviceGray".into()),
                    other => Some(String::from_utf8_lossy(other).into_owned()),
                }
            }
            _ => None,
        }
    }

    /// The `/XObject` dictionary of a page, following `/Resources` up the page
    /// tree when the page inherits it.
    fn page_xobjects(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node_id = page_id;
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let node = self.document.get_dictionary(node_id).ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                let resources = self.resolve_dict(resources)?;
                return resources
                    .get(b"XObject")
                    .ok()
                    .and_then(|xobjects| self.resolve_dict(xobjects));
            }
            node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
        None
    }

    fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        match object {
            Object::Dictionary(dict) => Some(dict),
            Object::Reference(id) => self.document.get_dictionary(*id).ok(),
            _ => None,
        }
    }
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// The filter applied last when the stream was encoded, which decides the
/// on-disk format of the image.
fn last_filter(dict: &Dictionary) -> Option<String> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Array(filters) => filters
            .last()
            .and_then(|f| f.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Image bytes with every filter undone except a final `DCTDecode` or
/// `JPXDecode`, whose output is already a complete file.
fn image_bytes(stream: &Stream, last: Option<&str>) -> lopdf::Result<Vec<u8>> {
    let Some(last) = last else {
        return Ok(stream.content.clone());
    };
    if !matches!(last, "DCTDecode" | "JPXDecode") {
        return stream.decompressed_content();
    }

    let filters = match stream.dict.get(b"Filter")? {
        Object::Array(filters) if filters.len() > 1 => filters,
        _ => return Ok(stream.content.clone()),
    };
    let mut outer = stream.clone();
    outer
        .dict
        .set("Filter", Object::Array(filters[..filters.len() - 1].to_vec()));
    // Per-filter parameters: keep the ones for the filters still applied.
    if let Ok(Object::Array(params)) = stream.dict.get(b"DecodeParms") {
        match params.first() {
            Some(first @ Object::Dictionary(_)) => outer.dict.set("DecodeParms", first.clone()),
            _ => {
                outer.dict.remove(b"DecodeParms");
            }
        }
    }
    outer.decompressed_content()
}

// -- Assembly -----------------------------------------------------------------

/// Build a new PDF from pages of existing documents.
///
/// Each entry of `pages` is a `(index into sources, page number)` pair; pages
/// appear in the output in the order given. Shared objects (fonts, images)
/// referenced by several pages of the same source are copied once.
#[instrument(skip_all, fields(sources = sources.len(), pages = pages.len()))]
pub fn assemble_pages(
    sources: &[&Document],
    pages: &[(usize, u32)],
) -> Result<Vec<u8>, SiftError> {
    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    // Source-to-target object id maps, one per source document.
    let mut copied: Vec<HashMap<ObjectId, ObjectId>> = vec![HashMap::new(); sources.len()];

    for &(source_index, page_number) in pages {
        let source = *sources.get(source_index).ok_or_else(|| {
            SiftError::PdfError(format!("no source document #{}", source_index))
        })?;
        let source_pages = source.get_pages();
        let page_id = *source_pages.get(&page_number).ok_or_else(|| {
            SiftError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                source_pages.len()
            ))
        })?;
        let new_page_id =
            copy_page(source, &mut target, page_id, pages_id, &mut copied[source_index])?;

        if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(pages_id) {
            if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
                kids.push(Object::Reference(new_page_id));
            }
            if let Ok(Object::Integer(count)) = pages_dict.get_mut(b"Count") {
                *count += 1;
            }
        }
    }

    let mut output = Vec::new();
    target.save_to(&mut output).map_err(|err| {
        SiftError::PdfError(format!("failed to serialise assembled PDF: {}", err))
    })?;

    debug!(output_bytes = output.len(), "Assembly complete");
    Ok(output)
}

/// Copy one page into `target` under the `/Pages` node `pages_id`.
///
/// Attributes a page may inherit from its ancestors (`Resources`, `MediaBox`,
/// `CropBox`, `Rotate`) are flattened onto the copy, since the copy gets a new
/// parent.
fn copy_page(
    source: &Document,
    target: &mut Document,
    page_id: ObjectId,
    pages_id: ObjectId,
    seen: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId, SiftError> {
    let page = source.get_dictionary(page_id).map_err(|err| {
        SiftError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
    })?;

    let mut flattened = page.clone();
    for key in [&b"Resources"[..], b"MediaBox", b"CropBox", b"Rotate"] {
        if flattened.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page, key) {
            flattened.set(key.to_vec(), value.clone());
        }
    }

    let new_id = target.new_object_id();
    seen.insert(page_id, new_id);
    let Object::Dictionary(mut copy) =
        copy_object(source, target, &Object::Dictionary(flattened), seen)?
    else {
        return Err(SiftError::PdfError("page copy is not a dictionary".into()));
    };
    copy.set("Parent", Object::Reference(pages_id));
    target.objects.insert(new_id, Object::Dictionary(copy));
    Ok(new_id)
}

fn inherited_attribute<'a>(
    source: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = source.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Deep-copy an object, following references.
///
/// `/Parent` entries are dropped (the caller patches the page's parent) and
/// every source object is copied at most once, so reference cycles such as
/// annotation `/P` back-links terminate.
fn copy_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    seen: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object, SiftError> {
    match object {
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dict(source, target, dict, seen)?)),
        Object::Array(items) => {
            let mut copied = Vec::with_capacity(items.len());
            for item in items {
                copied.push(copy_object(source, target, item, seen)?);
            }
            Ok(Object::Array(copied))
        }
        Object::Reference(ref_id) => {
            if let Some(new_id) = seen.get(ref_id) {
                return Ok(Object::Reference(*new_id));
            }
            match source.get_object(*ref_id) {
                Ok(referenced) => {
                    let new_id = target.new_object_id();
                    seen.insert(*ref_id, new_id);
                    let copied = copy_object(source, target, referenced, seen)?;
                    target.objects.insert(new_id, copied);
                    Ok(Object::Reference(new_id))
                }
                Err(err) => {
                    warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                    Ok(Object::Null)
                }
            }
        }
        Object::Stream(stream) => {
            let dict = copy_dict(source, target, &stream.dict, seen)?;
            let mut copied = lopdf::Stream::new(dict, stream.content.clone());
            copied.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copied))
        }
        other => Ok(other.clone()),
    }
}

fn copy_dict(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    seen: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary, SiftError> {
    let mut copied = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        copied.set(key.clone(), copy_object(source, target, value, seen)?);
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixtureImage, fixture_pdf, fixture_pdf_drawing};

    #[test]
    fn counts_pages_and_reads_text() {
        let bytes = fixture_pdf(&[Some("Hello pdfsift"), Some("Second page")], None);
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        assert_eq!(reader.page_count(), 2);
        assert_eq!(reader.page_numbers(), vec![1, 2]);
        assert!(reader.page_text(1).expect("text").contains("Hello pdfsift"));

        let all = reader.text().expect("text");
        let first = all.find("Hello pdfsift").expect("page 1");
        let second = all.find("Second page").expect("page 2");
        assert!(first < second);
    }

    #[test]
    fn blank_page_has_no_text() {
        let bytes = fixture_pdf(&[None, Some("words")], None);
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        assert!(!reader.page_has_text(1));
        assert!(reader.page_has_text(2));
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        assert!(matches!(
            PdfReader::from_bytes(b"not a pdf"),
            Err(SiftError::PdfError(_))
        ));
    }

    #[test]
    fn finds_images_through_inherited_resources() {
        let bytes = fixture_pdf(&[Some("with image"), None], Some(FixtureImage::Jpeg));
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let images = reader.images().expect("images");
        // The fixture shares one resource dictionary, inherited by both pages.
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].page, 1);
        assert_eq!(images[1].page, 2);
        assert_eq!(images[0].index, 1);
        assert_eq!(images[0].filter.as_deref(), Some("DCTDecode"));
        assert_eq!((images[0].width, images[0].height), (8, 6));
        assert_eq!(&images[0].data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn flate_images_are_decoded() {
        let bytes = fixture_pdf(&[Some("flate")], Some(FixtureImage::FlateRgb));
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let images = reader.images().expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].filter.as_deref(), Some("FlateDecode"));
        assert_eq!(images[0].color_space.as_deref(), Some("DeviceRGB"));
        assert_eq!(images[0].data.len(), 8 * 6 * 3);
    }

    #[test]
    fn images_only_count_where_the_page_draws_them() {
        let bytes = fixture_pdf_drawing(
            &[Some("declared only"), Some("drawn")],
            Some(FixtureImage::Jpeg),
            &[false, true],
        );
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let images = reader.images().expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].page, 2);
        assert_eq!(images[0].index, 1);
    }

    #[test]
    fn icc_based_colour_space_maps_to_its_device_family() {
        let bytes = fixture_pdf(&[Some("icc")], Some(FixtureImage::IccRgb));
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let images = reader.images().expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].color_space.as_deref(), Some("DeviceRGB"));
        assert_eq!(images[0].data.len(), 8 * 6 * 3);
    }

    #[test]
    fn flate_wrapped_jpeg_is_unwrapped_to_the_jpeg_file() {
        let bytes = fixture_pdf(&[Some("chain")], Some(FixtureImage::FlateJpeg));
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let images = reader.images().expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].filter.as_deref(), Some("DCTDecode"));
        assert_eq!(&images[0].data[..2], &[0xFF, 0xD8]);
        ::image::load_from_memory_with_format(&images[0].data, ::image::ImageFormat::Jpeg)
            .expect("decodable jpeg");
    }

    #[test]
    fn assembles_pages_from_two_documents() {
        let a = fixture_pdf(&[Some("alpha one"), Some("alpha two")], None);
        let b = fixture_pdf(&[Some("beta one")], None);
        let a = PdfReader::from_bytes(&a).expect("a");
        let b = PdfReader::from_bytes(&b).expect("b");

        let merged = assemble_pages(&[a.document(), b.document()], &[(0, 1), (1, 1), (0, 2)])
            .expect("assemble");
        let merged = PdfReader::from_bytes(&merged).expect("merged");

        assert_eq!(merged.page_count(), 3);
        assert!(merged.page_text(1).expect("p1").contains("alpha one"));
        assert!(merged.page_text(2).expect("p2").contains("beta one"));
        assert!(merged.page_text(3).expect("p3").contains("alpha two"));
    }

    #[test]
    fn assembling_a_missing_page_fails() {
        let a = fixture_pdf(&[Some("only")], None);
        let a = PdfReader::from_bytes(&a).expect("a");
        assert!(assemble_pages(&[a.document()], &[(0, 4)]).is_err());
        assert!(assemble_pages(&[a.document()], &[(1, 1)]).is_err());
    }
}
