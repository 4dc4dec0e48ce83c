//! Title-block metadata mining.
//!
//! Engineering drawings carry a title block with the drawing number,
//! revision, scale, date and sheet. Its location is not standardized, so the
//! extractor searches the space-joined text of the whole document for
//! labelled fields and keeps the first match of each. Labels elsewhere on the
//! sheet (notes, callouts) can be picked up instead of the real title block.

use std::sync::LazyLock;

use regex::Regex;

/// Sheet position within a drawing set, e.g. sheet 2 of 5.
///
/// Serializes as a two-element array `[index, total]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(String, String)", into = "(String, String)")
)]
pub struct SheetNumber {
    pub index: String,
    pub total: String,
}

impl From<(String, String)> for SheetNumber {
    fn from((index, total): (String, String)) -> Self {
        Self { index, total }
    }
}

impl From<SheetNumber> for (String, String) {
    fn from(sheet: SheetNumber) -> Self {
        (sheet.index, sheet.total)
    }
}

/// Fields recovered from the title block. Absent fields did not match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawingInfo {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub drawing_number: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub revision: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub scale: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub date: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sheet: Option<SheetNumber>,
}

impl DrawingInfo {
    /// True when no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.drawing_number.is_none()
            && self.revision.is_none()
            && self.scale.is_none()
            && self.date.is_none()
            && self.sheet.is_none()
    }
}

struct TitlePatterns {
    drawing_number: Regex,
    revision: Regex,
    scale: Regex,
    date: Regex,
    sheet: Regex,
}

// Separators between a label and its value.
const SEP: &str = r"[\s.:#-]*";

static PATTERNS: LazyLock<Option<TitlePatterns>> = LazyLock::new(|| {
    Some(TitlePatterns {
        // Labels may chain ("Drawing: DWG-001"); the value follows the last one.
        drawing_number: Regex::new(&format!(
            r"(?i)(?:\b(?:DRAWING|DWG)(?:\s*(?:NUMBER|NO\b))?{SEP})+([A-Z0-9-]+)"
        ))
        .ok()?,
        revision: Regex::new(r"(?i)\b(?:REVISION|REV)[\s.:]*([A-Z0-9]+)").ok()?,
        scale: Regex::new(r"(?i)\bSCALE[\s.:]*(\d+:\d+|\d+/\d+)").ok()?,
        date: Regex::new(r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").ok()?,
        sheet: Regex::new(r"(?i)\b(?:SHEET|SHT)[\s.:]*(\d+)\s*(?:OF|/)\s*(\d+)").ok()?,
    })
});

/// Searches document text for labelled title-block fields.
pub struct TitleBlockExtractor;

impl TitleBlockExtractor {
    /// Extract fields from already-joined document text.
    pub fn extract(text: &str) -> DrawingInfo {
        let Some(patterns) = PATTERNS.as_ref() else {
            return DrawingInfo::default();
        };

        let first_group = |re: &Regex| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        DrawingInfo {
            drawing_number: first_group(&patterns.drawing_number),
            revision: first_group(&patterns.revision),
            scale: first_group(&patterns.scale),
            date: first_group(&patterns.date),
            sheet: patterns.sheet.captures(text).and_then(|caps| {
                Some(SheetNumber {
                    index: caps.get(1)?.as_str().to_string(),
                    total: caps.get(2)?.as_str().to_string(),
                })
            }),
        }
    }

    /// Join run texts with single spaces and extract from the result.
    pub fn extract_from_runs<'a>(texts: impl IntoIterator<Item = &'a str>) -> DrawingInfo {
        let joined = texts.into_iter().collect::<Vec<_>>().join(" ");
        Self::extract(&joined)
    }
}
