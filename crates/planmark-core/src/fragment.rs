use crate::content::PageContent;
use crate::geometry::{BBox, round_to};

/// A positioned piece of text taken from one span of a page.
///
/// Fragments are also the shape of clustered runs: a run is a fragment
/// whose `text` and `bbox` cover one or more merged inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Trimmed, non-empty text.
    pub text: String,
    /// Left edge, rounded to 2 decimals.
    pub x: f64,
    /// Top edge, rounded to 2 decimals.
    pub y: f64,
    /// Bounding box, rounded to 2 decimals.
    pub bbox: BBox,
    /// Font name; empty when unknown.
    pub font: String,
    /// Font size rounded to 1 decimal; zero when unknown.
    pub size: f64,
}

impl TextFragment {
    /// Build a fragment positioned at the top-left corner of `bbox`.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            x: bbox.x0,
            y: bbox.top,
            bbox,
            font: String::new(),
            size: 0.0,
        }
    }
}

/// Flattens a page's block → line → span tree into fragments.
pub struct FragmentCollector;

impl FragmentCollector {
    /// Collect the page's text fragments in emission order.
    ///
    /// Blocks without lines (images, empty text objects) are skipped, as are
    /// spans whose trimmed text is empty. Positions are rounded to 2 decimal
    /// places and sizes to 1.
    pub fn collect(page: &PageContent) -> Vec<TextFragment> {
        page.spans()
            .filter_map(|span| {
                let text = span.text.trim();
                if text.is_empty() {
                    return None;
                }
                let bbox = span.bbox.rounded(2);
                Some(TextFragment {
                    text: text.to_string(),
                    x: bbox.x0,
                    y: bbox.top,
                    bbox,
                    font: span.font.clone(),
                    size: round_to(span.size, 1),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Block, Line, Span};

    fn page_with(blocks: Vec<Block>) -> PageContent {
        let mut page = PageContent::new(612.0, 792.0, 0);
        page.blocks = blocks;
        page
    }

    fn line(spans: Vec<Span>) -> Line {
        Line {
            bbox: BBox::default(),
            spans,
        }
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(FragmentCollector::collect(&page_with(vec![])).is_empty());
    }

    #[test]
    fn skips_image_blocks_and_blank_spans() {
        let page = page_with(vec![
            Block::Image {
                bbox: BBox::new(0.0, 0.0, 50.0, 50.0),
            },
            Block::Text {
                bbox: BBox::default(),
                lines: vec![line(vec![
                    Span::new("   ", BBox::new(1.0, 1.0, 2.0, 2.0)),
                    Span::new(" BP1 ", BBox::new(10.0, 20.0, 30.0, 32.0)),
                    Span::new("", BBox::new(1.0, 1.0, 2.0, 2.0)),
                ])],
            },
        ]);
        let frags = FragmentCollector::collect(&page);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "BP1");
        assert_eq!(frags[0].x, 10.0);
        assert_eq!(frags[0].y, 20.0);
    }

    #[test]
    fn rounds_positions_and_size() {
        let mut span = Span::new("SC2", BBox::new(10.126, 20.333, 30.999, 40.0));
        span.font = "Helvetica".to_string();
        span.size = 11.96;
        let page = page_with(vec![Block::Text {
            bbox: BBox::default(),
            lines: vec![line(vec![span])],
        }]);
        let frags = FragmentCollector::collect(&page);
        assert_eq!(frags[0].x, 10.13);
        assert_eq!(frags[0].y, 20.33);
        assert_eq!(frags[0].bbox, BBox::new(10.13, 20.33, 31.0, 40.0));
        assert_eq!(frags[0].size, 12.0);
        assert_eq!(frags[0].font, "Helvetica");
    }

    #[test]
    fn missing_font_metadata_defaults() {
        let page = page_with(vec![Block::Text {
            bbox: BBox::default(),
            lines: vec![line(vec![Span::new("W1", BBox::new(0.0, 0.0, 5.0, 5.0))])],
        }]);
        let frags = FragmentCollector::collect(&page);
        assert_eq!(frags[0].font, "");
        assert_eq!(frags[0].size, 0.0);
    }

    #[test]
    fn preserves_emission_order() {
        let page = page_with(vec![
            Block::Text {
                bbox: BBox::default(),
                lines: vec![
                    line(vec![Span::new("lower", BBox::new(0.0, 500.0, 10.0, 510.0))]),
                    line(vec![Span::new("upper", BBox::new(0.0, 10.0, 10.0, 20.0))]),
                ],
            },
            Block::Text {
                bbox: BBox::default(),
                lines: vec![line(vec![Span::new("last", BBox::new(0.0, 0.0, 1.0, 1.0))])],
            },
        ]);
        let texts: Vec<String> = FragmentCollector::collect(&page)
            .into_iter()
            .map(|f| f.text)
            .collect();
        assert_eq!(texts, vec!["lower", "upper", "last"]);
    }
}
