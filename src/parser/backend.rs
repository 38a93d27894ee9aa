//! Block provider abstraction.
//!
//! The outline engine only needs per-page blocks and page widths. This trait
//! isolates it from the concrete PDF library (lopdf) so that tests and other
//! layout engines can feed blocks directly.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::layout::{build_blocks, get_number, resolve, PageInterpreter};
use crate::detect::sniff_file;
use crate::error::{Error, Result};
use crate::model::{BBox, Block};

/// US Letter, used when a page tree carries no usable MediaBox.
const DEFAULT_MEDIA_BOX: BBox = BBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// Source of positioned blocks for each page of a document.
///
/// Page numbers are 1-indexed.
pub trait BlockProvider {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Width of the given page in points.
    fn page_width(&self, page: u32) -> Result<f32>;

    /// Blocks of the given page, in reading order.
    fn page_blocks(&self, page: u32) -> Result<Vec<Block>>;
}

/// [`BlockProvider`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    normalize_unicode: bool,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_file(path)?;
        log::debug!("{}: {}", path.display(), header);

        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        crate::detect::sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages();
        Ok(Self {
            doc,
            pages,
            normalize_unicode: true,
        })
    }

    /// Enable or disable NFKC normalization of decoded text.
    pub fn with_normalize_unicode(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// PDF version declared by the document.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// MediaBox of a page, inherited through /Parent when absent.
    fn media_box(&self, page_id: ObjectId) -> Result<BBox> {
        let mut dict = self.doc.get_dictionary(page_id)?;
        // Bounded walk; malformed trees may loop through /Parent
        for _ in 0..32 {
            if let Some(arr) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| resolve(&self.doc, o))
                .and_then(|o| o.as_array().ok())
            {
                let n: Vec<f32> = arr
                    .iter()
                    .filter_map(|o| resolve(&self.doc, o).and_then(get_number))
                    .collect();
                if n.len() >= 4 {
                    return Ok(BBox::new(
                        n[0].min(n[2]),
                        n[1].min(n[3]),
                        n[0].max(n[2]),
                        n[1].max(n[3]),
                    ));
                }
            }

            match dict
                .get(b"Parent")
                .ok()
                .and_then(|o| o.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok())
            {
                Some(parent) => dict = parent,
                None => break,
            }
        }
        Ok(DEFAULT_MEDIA_BOX)
    }

    /// Decompressed content of a page, concatenating content arrays.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page = self.doc.get_dictionary(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(obj) => obj,
            // A page without /Contents is blank
            Err(_) => return Ok(Vec::new()),
        };

        let streams: Vec<&Object> = match contents {
            Object::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        let mut content = Vec::new();
        for obj in streams {
            match resolve(&self.doc, obj) {
                Some(Object::Stream(stream)) => {
                    let data = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                }
                _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        }
        Ok(content)
    }
}

impl BlockProvider for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_width(&self, page: u32) -> Result<f32> {
        let media = self.media_box(self.page_id(page)?)?;
        Ok(media.width())
    }

    fn page_blocks(&self, page: u32) -> Result<Vec<Block>> {
        let page_id = self.page_id(page)?;
        let media = self.media_box(page_id)?;
        let fonts = self.doc.get_page_fonts(page_id)?;
        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let interpreter = PageInterpreter::new(&self.doc, fonts, self.normalize_unicode);
        let (spans, xobjects) = interpreter.run(&content)?;
        log::trace!(
            "page {}: {} text runs, {} xobjects",
            page,
            spans.len(),
            xobjects.len()
        );
        Ok(build_blocks(spans, &xobjects, media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    fn sample_pdf(with_media_on_parent: bool) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Quarterly Review")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 1,
            "Resources" => resources_id,
        };
        let media: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
        if with_media_on_parent {
            pages.set("MediaBox", media);
        } else {
            page.set("MediaBox", media);
        }
        let page_id = doc.add_object(page);
        pages.set("Kids", vec![Object::Reference(page_id)]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_load_bytes_and_read_blocks() {
        let backend = LopdfBackend::load_bytes(&sample_pdf(false)).unwrap();
        assert_eq!(backend.page_count(), 1);
        assert_eq!(backend.page_width(1).unwrap(), 595.0);

        let blocks = backend.page_blocks(1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Quarterly Review");
        assert_eq!(blocks[0].font_size(), 24.0);
        assert!(blocks[0].spans[0].is_bold());
        assert!(blocks[0].bbox.x0 > 71.0 && blocks[0].bbox.x0 < 73.0);
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let backend = LopdfBackend::load_bytes(&sample_pdf(true)).unwrap();
        assert_eq!(backend.page_width(1).unwrap(), 595.0);
    }

    #[test]
    fn test_page_out_of_range() {
        let backend = LopdfBackend::load_bytes(&sample_pdf(false)).unwrap();
        assert!(matches!(
            backend.page_blocks(5),
            Err(Error::PageOutOfRange(5, 1))
        ));
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"just some text"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_load_reader() {
        let data = sample_pdf(false);
        let backend = LopdfBackend::load_reader(std::io::Cursor::new(data)).unwrap();
        assert!(backend.version().starts_with("1."));
    }
}
