//! Page coordinate normalization: rotation and CropBox transforms.
//!
//! Maps PDF user space (bottom-left origin) onto the visible page as a
//! reader sees it: top-left origin, measured from the CropBox corner, after
//! applying `/Rotate`. Also turns interpreter events into boxes in that
//! space.

use planmark_core::{BBox, Ctm};

use crate::handler::{ImageEvent, SpanEvent};

/// Page coordinate normalization configuration.
///
/// Box arguments use raw PDF array values in a [`BBox`]: `x0` = left,
/// `top` = y-min (PDF bottom), `x1` = right, `bottom` = y-max (PDF top).
///
/// # Example
///
/// ```
/// use planmark_core::BBox;
/// use planmark_parse::PageGeometry;
///
/// let geo = PageGeometry::new(BBox::new(0.0, 0.0, 612.0, 792.0), None, 0);
/// assert_eq!(geo.width(), 612.0);
///
/// // y=720 in PDF space is 72 units below the top edge
/// let (x, y) = geo.normalize_point(72.0, 720.0);
/// assert!((x - 72.0).abs() < 1e-9);
/// assert!((y - 72.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    rotation: i32,
    media_x0: f64,
    media_y0: f64,
    native_width: f64,
    native_height: f64,
    crop_rx0: f64,
    crop_ry0: f64,
    display_width: f64,
    display_height: f64,
}

/// Normalize a `/Rotate` value to 0, 90, 180 or 270.
///
/// Values that are not multiples of 90 are rounded down to one.
pub fn normalize_rotation(rotation: i64) -> i32 {
    // rem_euclid keeps the result in 0..360, which fits in i32
    ((rotation.rem_euclid(360) / 90) * 90) as i32
}

impl PageGeometry {
    /// Build from the MediaBox, optional CropBox and raw `/Rotate` value.
    ///
    /// A CropBox is clipped to the MediaBox.
    pub fn new(media_box: BBox, crop_box: Option<BBox>, rotation: i32) -> Self {
        let rotation = normalize_rotation(i64::from(rotation));

        let media_x0 = media_box.x0;
        let media_y0 = media_box.top;
        let native_width = media_box.width();
        let native_height = media_box.height();

        let crop = crop_box
            .map(|c| {
                BBox::new(
                    c.x0.max(media_box.x0),
                    c.top.max(media_box.top),
                    c.x1.min(media_box.x1),
                    c.bottom.min(media_box.bottom),
                )
            })
            .filter(|c| c.width() > 0.0 && c.height() > 0.0)
            .unwrap_or(media_box);

        // CropBox relative to the MediaBox origin
        let cx0 = crop.x0 - media_x0;
        let cy0 = crop.top - media_y0;
        let cx1 = crop.x1 - media_x0;
        let cy1 = crop.bottom - media_y0;

        let (crop_rx0, crop_ry0, crop_rx1, crop_ry1) = match rotation {
            90 => (cy0, native_width - cx1, cy1, native_width - cx0),
            180 => (
                native_width - cx1,
                native_height - cy1,
                native_width - cx0,
                native_height - cy0,
            ),
            270 => (native_height - cy1, cx0, native_height - cy0, cx1),
            _ => (cx0, cy0, cx1, cy1),
        };

        Self {
            rotation,
            media_x0,
            media_y0,
            native_width,
            native_height,
            crop_rx0,
            crop_ry0,
            display_width: crop_rx1 - crop_rx0,
            display_height: crop_ry1 - crop_ry0,
        }
    }

    /// Visible page width after rotation and cropping.
    pub fn width(&self) -> f64 {
        self.display_width
    }

    /// Visible page height after rotation and cropping.
    pub fn height(&self) -> f64 {
        self.display_height
    }

    /// Rotation in degrees: 0, 90, 180 or 270.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Map a point from PDF user space to top-left display space.
    pub fn normalize_point(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x - self.media_x0;
        let py = y - self.media_y0;

        // clockwise page rotation
        let (rx, ry) = match self.rotation {
            90 => (py, self.native_width - px),
            180 => (self.native_width - px, self.native_height - py),
            270 => (self.native_height - py, px),
            _ => (px, py),
        };

        let cx = rx - self.crop_rx0;
        let cy = ry - self.crop_ry0;
        (cx, self.display_height - cy)
    }

    /// Smallest display-space box covering the given user-space points.
    pub fn normalize_points(&self, points: &[(f64, f64)]) -> BBox {
        let mut mapped = points.iter().map(|&(x, y)| self.normalize_point(x, y));
        let Some((x, y)) = mapped.next() else {
            return BBox::default();
        };
        mapped.fold(BBox::new(x, y, x, y), |acc, (x, y)| {
            acc.union(&BBox::new(x, y, x, y))
        })
    }
}

/// Display-space box of a shown span.
///
/// Horizontally the span runs from the start of the text matrix over its
/// advance; vertically it covers the font's descent to ascent, shifted by the
/// text rise.
pub fn span_bbox(span: &SpanEvent, geometry: &PageGeometry) -> BBox {
    let m = span.text_matrix.concat(&span.ctm);
    let low = span.rise + span.descent / 1000.0 * span.font_size;
    let high = span.rise + span.ascent / 1000.0 * span.font_size;
    let corners = [
        m.transform_point(0.0, low),
        m.transform_point(span.advance, low),
        m.transform_point(0.0, high),
        m.transform_point(span.advance, high),
    ];
    geometry.normalize_points(&corners)
}

/// Display-space box of a placed image: the unit square under the CTM.
pub fn image_bbox(image: &ImageEvent, geometry: &PageGeometry) -> BBox {
    unit_square(&image.ctm, geometry)
}

fn unit_square(ctm: &Ctm, geometry: &PageGeometry) -> BBox {
    let corners = [
        ctm.transform_point(0.0, 0.0),
        ctm.transform_point(1.0, 0.0),
        ctm.transform_point(0.0, 1.0),
        ctm.transform_point(1.0, 1.0),
    ];
    geometry.normalize_points(&corners)
}
