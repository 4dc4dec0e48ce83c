//! Shared helpers for building drawing PDFs in memory.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// One page of a test document.
pub struct TestPage {
    pub content: Vec<u8>,
    pub media_box: [i64; 4],
    pub crop_box: Option<[i64; 4]>,
    pub rotate: Option<i64>,
}

impl TestPage {
    /// A US Letter page with the given content stream.
    pub fn letter(content: &str) -> Self {
        Self {
            content: content.as_bytes().to_vec(),
            media_box: [0, 0, 612, 792],
            crop_box: None,
            rotate: None,
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn cropped(mut self, crop_box: [i64; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }
}

fn box_object(values: [i64; 4]) -> Object {
    Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
}

/// Build a PDF from the given pages. Every page shares a Helvetica font as
/// `/F1` and a 2x2 RGB image as `/Im1`.
pub fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![0u8; 12],
    ));

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page.content.clone()));
        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => box_object(page.media_box),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                "XObject" => dictionary! { "Im1" => Object::Reference(image_id) },
            },
        };
        if let Some(crop_box) = page.crop_box {
            dict.set("CropBox", box_object(crop_box));
        }
        if let Some(rotate) = page.rotate {
            dict.set("Rotate", Object::Integer(rotate));
        }
        kids.push(Object::Reference(doc.add_object(dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Content stream placing each `(text, x, y, size)` in its own text object.
pub fn text_content(items: &[(&str, f64, f64, f64)]) -> String {
    items
        .iter()
        .map(|(text, x, y, size)| format!("BT /F1 {size} Tf {x} {y} Td ({text}) Tj ET\n"))
        .collect()
}

/// The sample sheet: a split "SC1" callout, a detail title, a gridline row
/// of markers, a title block and two painted paths.
pub fn sample_sheet() -> String {
    let mut content = text_content(&[
        ("S", 100.0, 700.0, 12.0),
        ("C", 102.0, 700.0, 12.0),
        ("1", 104.0, 700.0, 12.0),
        ("BASE PLATE DETAIL", 150.0, 700.0, 10.0),
        ("BP2 - Steel Connection", 100.0, 600.0, 10.0),
        ("RW3", 100.0, 500.0, 10.0),
        ("C1", 200.0, 500.0, 10.0),
        ("FB4", 300.0, 500.0, 10.0),
        ("Drawing: DWG-001 Rev: A", 400.0, 100.0, 8.0),
        ("Scale: 1:50", 400.0, 80.0, 8.0),
    ]);
    content.push_str("0 0 m 100 100 l S\n10 10 50 50 re f\n");
    content
}
