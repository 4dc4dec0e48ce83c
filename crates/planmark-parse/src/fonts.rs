//! Font loading: glyph widths, vertical metrics and text decoding.
//!
//! Simple fonts read `/Widths`, `/FirstChar`, `/LastChar` and the
//! `/FontDescriptor`. Type0 fonts read `/DW` and `/W` from their descendant
//! CIDFont and use two-byte codes (Identity CMaps). Text comes from the
//! font's `/ToUnicode` CMap when present; simple fonts otherwise decode each
//! byte as Windows-1252.

use std::collections::HashMap;

use encoding_rs::WINDOWS_1252;
use lopdf::{Dictionary, Document, Object};

use crate::cmap::ToUnicodeCMap;
use crate::error::BackendError;

/// Default ascent when not specified (750/1000 of text space).
const DEFAULT_ASCENT: f64 = 750.0;

/// Default descent when not specified (-250/1000 of text space).
const DEFAULT_DESCENT: f64 = -250.0;

/// Default width for simple fonts without `/MissingWidth`.
const DEFAULT_WIDTH: f64 = 600.0;

/// Default width for CID fonts without `/DW`.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
enum WidthTable {
    /// `/Widths` indexed by `code - first_char`.
    Simple { first_char: u32, widths: Vec<f64> },
    /// Sparse CID → width map built from `/W`.
    Cid(HashMap<u32, f64>),
}

/// Glyph widths and vertical metrics, in glyph space units (1/1000 of text
/// space).
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    table: WidthTable,
    missing_width: f64,
    ascent: f64,
    descent: f64,
}

impl FontMetrics {
    /// Metrics for a simple font.
    pub fn simple(
        first_char: u32,
        widths: Vec<f64>,
        missing_width: f64,
        ascent: f64,
        descent: f64,
    ) -> Self {
        Self {
            table: WidthTable::Simple { first_char, widths },
            missing_width,
            ascent,
            descent,
        }
    }

    /// Metrics for a CID font. `default_width` is `/DW`.
    pub fn cid(widths: HashMap<u32, f64>, default_width: f64, ascent: f64, descent: f64) -> Self {
        Self {
            table: WidthTable::Cid(widths),
            missing_width: default_width,
            ascent,
            descent,
        }
    }

    /// Metrics used when the font dictionary is unavailable.
    pub fn default_metrics() -> Self {
        Self::simple(0, Vec::new(), DEFAULT_WIDTH, DEFAULT_ASCENT, DEFAULT_DESCENT)
    }

    /// Width of a character code. Codes without an entry get the missing width.
    pub fn get_width(&self, code: u32) -> f64 {
        let found = match &self.table {
            WidthTable::Simple { first_char, widths } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied(),
            WidthTable::Cid(map) => map.get(&code).copied(),
        };
        found.unwrap_or(self.missing_width)
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }
}

/// One decoded glyph of a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Character code as read from the string.
    pub code: u32,
    /// Unicode text for the code; may hold several characters.
    pub text: String,
    /// Single-byte code 32, the only code that receives word spacing.
    pub is_space: bool,
}

/// A font resource ready for decoding and measuring strings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFont {
    /// `/BaseFont` without subset prefix, or the resource name if absent.
    pub base_name: String,
    pub metrics: FontMetrics,
    pub to_unicode: Option<ToUnicodeCMap>,
    /// Type0 fonts read two bytes per code.
    pub two_byte: bool,
}

impl LoadedFont {
    /// Default metrics and Windows-1252 decoding under the given name.
    pub fn fallback(name: &str) -> Self {
        Self {
            base_name: strip_subset_prefix(name).to_string(),
            metrics: FontMetrics::default_metrics(),
            to_unicode: None,
            two_byte: false,
        }
    }

    /// Split a shown string into glyphs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| {
                    let code = pair.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                    let text = self
                        .lookup(code)
                        .unwrap_or_else(|| char::REPLACEMENT_CHARACTER.to_string());
                    Glyph {
                        code,
                        text,
                        is_space: false,
                    }
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|&b| {
                    let code = u32::from(b);
                    let text = self.lookup(code).unwrap_or_else(|| {
                        let byte = [b];
                        let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&byte);
                        decoded.into_owned()
                    });
                    Glyph {
                        code,
                        text,
                        is_space: b == b' ',
                    }
                })
                .collect()
        }
    }

    fn lookup(&self, code: u32) -> Option<String> {
        self.to_unicode
            .as_ref()
            .and_then(|cmap| cmap.lookup(code))
            .map(str::to_string)
    }
}

/// Strip a subset tag such as `ABCDEF+` from a font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Load `/Resources/Font/<name>`.
///
/// A missing resource is an error; the caller decides whether to fall back.
/// A ToUnicode stream that fails to parse is logged and ignored.
pub fn load_font(
    doc: &Document,
    resources: &Dictionary,
    name: &str,
) -> Result<LoadedFont, BackendError> {
    let font_dict = resources
        .get(b"Font")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .and_then(|fonts| fonts.get(name.as_bytes()).ok())
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .ok_or_else(|| BackendError::Font(format!("font /{name} not found in resources")))?;

    let base_name = font_dict
        .get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .unwrap_or_else(|| name.to_string());

    let two_byte = matches!(
        font_dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok()),
        Some(b"Type0")
    );
    let metrics = if two_byte {
        cid_metrics(doc, font_dict)
    } else {
        simple_metrics(doc, font_dict)
    };

    let to_unicode = match font_dict.get(b"ToUnicode") {
        Ok(obj) => match resolve(doc, obj).as_stream() {
            Ok(stream) => match stream_bytes(stream).and_then(|data| ToUnicodeCMap::parse(&data)) {
                Ok(cmap) => Some(cmap),
                Err(e) => {
                    tracing::warn!(font = name, error = %e, "ignoring unreadable ToUnicode CMap");
                    None
                }
            },
            Err(_) => None,
        },
        Err(_) => None,
    };

    Ok(LoadedFont {
        base_name: strip_subset_prefix(&base_name).to_string(),
        metrics,
        to_unicode,
        two_byte,
    })
}

fn simple_metrics(doc: &Document, font_dict: &Dictionary) -> FontMetrics {
    let first_char = font_dict
        .get(b"FirstChar")
        .ok()
        .and_then(number)
        .map(|v| v as u32)
        .unwrap_or(0);

    let widths = font_dict
        .get(b"Widths")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|o| number(resolve(doc, o)).unwrap_or(0.0))
                .collect()
        })
        .unwrap_or_default();

    let descriptor = descriptor(doc, font_dict);
    FontMetrics::simple(
        first_char,
        widths,
        descriptor.missing_width.unwrap_or(DEFAULT_WIDTH),
        descriptor.ascent,
        descriptor.descent,
    )
}

fn cid_metrics(doc: &Document, font_dict: &Dictionary) -> FontMetrics {
    let Some(cid_font) = font_dict
        .get(b"DescendantFonts")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| arr.first())
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return FontMetrics::cid(
            HashMap::new(),
            DEFAULT_CID_WIDTH,
            DEFAULT_ASCENT,
            DEFAULT_DESCENT,
        );
    };

    let default_width = cid_font
        .get(b"DW")
        .ok()
        .and_then(number)
        .unwrap_or(DEFAULT_CID_WIDTH);

    let widths = cid_font
        .get(b"W")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| parse_w_array(doc, arr))
        .unwrap_or_default();

    let descriptor = descriptor(doc, cid_font);
    FontMetrics::cid(widths, default_width, descriptor.ascent, descriptor.descent)
}

/// Largest CID a `/W` entry may name.
const MAX_CID: u32 = 0xFFFF;

/// Longest `c_first c_last w` run accepted from a `/W` array.
const MAX_W_RANGE: u32 = 0x1_0000;

/// Parse a CIDFont `/W` array.
///
/// Entries are either `c [w1 w2 ...]` (consecutive CIDs from `c`) or
/// `c_first c_last w` (one width for the whole range). Entries naming CIDs
/// outside `0..=0xFFFF` are skipped.
fn parse_w_array(doc: &Document, arr: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < arr.len() {
        let Some(first) = number(resolve(doc, &arr[i])) else {
            break;
        };
        match arr.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                match cid_of(first) {
                    Some(first) => {
                        for (offset, w) in list.iter().enumerate() {
                            let Some(cid) = u32::try_from(offset)
                                .ok()
                                .and_then(|offset| first.checked_add(offset))
                                .filter(|&cid| cid <= MAX_CID)
                            else {
                                break;
                            };
                            if let Some(w) = number(resolve(doc, w)) {
                                widths.insert(cid, w);
                            }
                        }
                    }
                    None => tracing::warn!(cid = first, "skipping /W entry with invalid CID"),
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    arr.get(i + 2).map(|o| resolve(doc, o)).and_then(number),
                ) else {
                    break;
                };
                match (cid_of(first), cid_of(last)) {
                    (Some(first), Some(last)) if last >= first && last - first < MAX_W_RANGE => {
                        for cid in first..=last {
                            widths.insert(cid, w);
                        }
                    }
                    _ => tracing::warn!(first, last, "skipping invalid /W range"),
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

fn cid_of(n: f64) -> Option<u32> {
    (n >= 0.0 && n <= f64::from(MAX_CID)).then_some(n as u32)
}

struct Descriptor {
    ascent: f64,
    descent: f64,
    missing_width: Option<f64>,
}

fn descriptor(doc: &Document, font_dict: &Dictionary) -> Descriptor {
    let desc = font_dict
        .get(b"FontDescriptor")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok());

    let field = |key: &[u8]| desc.and_then(|d| d.get(key).ok()).and_then(number);
    Descriptor {
        ascent: field(b"Ascent").unwrap_or(DEFAULT_ASCENT),
        descent: field(b"Descent").unwrap_or(DEFAULT_DESCENT),
        missing_width: field(b"MissingWidth"),
    }
}

/// Resolve an indirect reference, returning the object itself otherwise.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Numeric value of an Integer or Real object.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Stream data, decompressed when the stream declares a filter.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}
