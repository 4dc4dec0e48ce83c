//! Page rotation and CropBox handling.
//!
//! Positions are reported in the page's display space: rotated clockwise by
//! `/Rotate`, relative to the CropBox, with a top-left origin.

mod common;

use common::{TestPage, build_pdf, text_content};
use planmark::{BBox, Drawing, extract_drawing};

#[test]
fn rotated_page_swaps_dimensions() {
    let content = text_content(&[("BP1", 100.0, 700.0, 10.0)]);
    let pdf = build_pdf(&[TestPage::letter(&content).rotated(90)]);
    let result = extract_drawing(&pdf).unwrap();

    let meta = &result.metadata[0];
    assert_eq!(meta.width, 792.0);
    assert_eq!(meta.height, 612.0);
    assert_eq!(meta.rotation, 90);
    assert_eq!(result.pages[0].rotation, 90);
}

#[test]
fn rotated_page_marker_position() {
    let content = text_content(&[("BP1", 100.0, 700.0, 10.0)]);
    let pdf = build_pdf(&[TestPage::letter(&content).rotated(90)]);
    let result = extract_drawing(&pdf).unwrap();

    let bp1 = &result.marker("BP1").unwrap()[0];
    // the baseline runs down the display page
    assert_eq!(bp1.bbox, BBox::new(697.5, 100.0, 707.5, 118.0));
    assert_eq!((bp1.x, bp1.y), (697.5, 100.0));
}

#[test]
fn upside_down_page() {
    let content = text_content(&[("C1", 100.0, 700.0, 10.0)]);
    let pdf = build_pdf(&[TestPage::letter(&content).rotated(180)]);
    let result = extract_drawing(&pdf).unwrap();

    assert_eq!(result.metadata[0].width, 612.0);
    // mirrored in both axes
    let c1 = &result.marker("C1").unwrap()[0];
    assert_eq!(c1.bbox, BBox::new(500.0, 697.5, 512.0, 707.5));
}

#[test]
fn negative_rotation_is_normalized() {
    let pdf = build_pdf(&[TestPage::letter("").rotated(-90)]);
    let drawing = Drawing::open(&pdf, None).unwrap();
    let geometry = drawing.page_geometry(0).unwrap();
    assert_eq!(geometry.rotation(), 270);
    assert_eq!(geometry.width(), 792.0);
}

#[test]
fn crop_box_offsets_positions() {
    let content = text_content(&[("C1", 100.0, 700.0, 10.0)]);
    let pdf = build_pdf(&[TestPage::letter(&content).cropped([36, 36, 576, 756])]);
    let result = extract_drawing(&pdf).unwrap();

    assert_eq!(result.metadata[0].width, 540.0);
    assert_eq!(result.metadata[0].height, 720.0);
    let c1 = &result.marker("C1").unwrap()[0];
    assert_eq!((c1.x, c1.y), (64.0, 48.5));
}
