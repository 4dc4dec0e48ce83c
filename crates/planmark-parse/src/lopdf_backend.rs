//! lopdf-based PDF parsing backend.
//!
//! Implements [`PdfBackend`] on top of the [lopdf](https://crates.io/crates/lopdf)
//! crate. This is the backend the facade uses.

use std::sync::LazyLock;

use lopdf::{Dictionary, Document, Object, ObjectId};
use planmark_core::{BBox, ExtractError, ExtractOptions};

use crate::backend::PdfBackend;
use crate::error::BackendError;
use crate::fonts::{number, resolve, stream_bytes};
use crate::handler::ContentHandler;
use crate::interpreter::interpret_content_stream;
use crate::interpreter_state::InterpreterState;
use crate::page_geometry::normalize_rotation;
use crate::text_state::TextState;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// A reference to a single page within a [`LopdfDocument`].
#[derive(Debug, Clone, Copy)]
pub struct LopdfPage {
    /// The lopdf object ID for this page.
    pub object_id: ObjectId,
    /// The 0-based page index.
    pub index: usize,
}

/// The lopdf-based PDF backend.
///
/// ```ignore
/// use planmark_parse::{LopdfBackend, PdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let page = LopdfBackend::get_page(&doc, 0)?;
/// let rotation = LopdfBackend::page_rotate(&doc, &page)?;
/// ```
pub struct LopdfBackend;

/// Four numbers `[x0, y0, x1, y1]` as a raw PDF box.
fn bbox_from_array(doc: &Document, array: &[Object]) -> Result<BBox, BackendError> {
    let values: Vec<f64> = array
        .iter()
        .map(|o| number(resolve(doc, o)))
        .collect::<Option<_>>()
        .ok_or_else(|| BackendError::Parse("box entries must be numbers".to_string()))?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(BBox::new(x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1))),
        _ => Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            values.len()
        ))),
    }
}

/// Look up a key on the page dictionary, walking up `/Parent` links when
/// the page itself does not carry it.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Guards against /Parent cycles
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)));
        }

        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current_id = parent,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn inherited_box(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<BBox>, BackendError> {
    match resolve_inherited(doc, page_id, key)? {
        Some(obj) => {
            let array = obj.as_array().map_err(|e| {
                BackendError::Parse(format!(
                    "{} is not an array: {e}",
                    String::from_utf8_lossy(key)
                ))
            })?;
            Ok(Some(bbox_from_array(doc, array)?))
        }
        None => Ok(None),
    }
}

/// Concatenated content stream bytes of a page.
///
/// `/Contents` may be one stream or an array of streams; streams are joined
/// with whitespace so operators never fuse across the boundary.
fn page_content_bytes(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let streams: Vec<&Object> = match resolve(doc, contents) {
        Object::Array(items) => items.iter().map(|o| resolve(doc, o)).collect(),
        other => vec![other],
    };

    let mut content = Vec::new();
    for obj in streams {
        let stream = obj
            .as_stream()
            .map_err(|e| BackendError::Parse(format!("/Contents entry is not a stream: {e}")))?;
        if !content.is_empty() {
            content.push(b'\n');
        }
        content.extend_from_slice(&stream_bytes(stream)?);
    }
    Ok(content)
}

/// Resources dictionary of a page, inherited if needed.
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, BackendError> {
    static EMPTY: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => obj
            .as_dict()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(&EMPTY),
    }
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Page = LopdfPage;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(ExtractError::PasswordRequired));
        }

        // get_pages is keyed by 1-based page number, so values come out in order
        let page_ids = inner.get_pages().into_values().collect();
        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error> {
        let object_id = doc.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Core(ExtractError::PageOutOfRange {
                index,
                count: doc.page_ids.len(),
            })
        })?;
        Ok(LopdfPage { object_id, index })
    }

    fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<BBox, Self::Error> {
        inherited_box(&doc.inner, page.object_id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))
    }

    fn page_crop_box(doc: &Self::Document, page: &Self::Page) -> Result<Option<BBox>, Self::Error> {
        inherited_box(&doc.inner, page.object_id, b"CropBox")
    }

    fn page_rotate(doc: &Self::Document, page: &Self::Page) -> Result<i32, Self::Error> {
        match resolve_inherited(&doc.inner, page.object_id, b"Rotate")? {
            Some(obj) => {
                let rotation = obj
                    .as_i64()
                    .map_err(|e| BackendError::Parse(format!("Rotate is not an integer: {e}")))?;
                Ok(normalize_rotation(rotation))
            }
            None => Ok(0),
        }
    }

    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        handler: &mut dyn ContentHandler,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error> {
        let inner = &doc.inner;
        let page_dict = inner
            .get_object(page.object_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        let content = page_content_bytes(inner, page_dict)?;
        let resources = page_resources(inner, page.object_id)?;

        interpret_content_stream(
            inner,
            &content,
            resources,
            handler,
            options,
            0,
            &mut InterpreterState::new(),
            &mut TextState::new(),
        )
    }
}

/// Build a PDF whose pages carry the given content streams.
///
/// Every page is US Letter and shares one Helvetica font resource `/F1`.
#[cfg(test)]
pub(crate) fn create_test_pdf(contents: &[&[u8]]) -> Vec<u8> {
    use lopdf::{Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            content.to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}
