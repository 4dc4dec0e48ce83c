//! ToUnicode CMap parsing.
//!
//! Reads the `bfchar` and `bfrange` sections of a font's `/ToUnicode`
//! stream. Destination strings are UTF-16BE; a single source code may map to
//! several characters (ligatures).

use std::collections::HashMap;

use crate::error::BackendError;

/// Longest `bfrange` accepted; longer ranges are skipped.
const MAX_RANGE_LEN: u32 = 0x1_0000;

/// Character code → Unicode string table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

/// Lexical pieces of a CMap body that matter for bf mappings.
#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(Vec<u8>),
    Number(u32),
    Open,
    Close,
    Word(&'a str),
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Char,
    Range,
}

impl ToUnicodeCMap {
    /// Parse a decoded ToUnicode stream.
    ///
    /// Entries that do not fit the expected shapes are skipped. Malformed hex
    /// inside a mapping is an error.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let tokens = tokenize(&text)?;

        let mut mappings = HashMap::new();
        let mut section = Section::None;
        let mut pending: Vec<Token<'_>> = Vec::new();
        let mut in_array = false;

        for token in tokens {
            match token {
                Token::Word("beginbfchar") => {
                    section = Section::Char;
                    pending.clear();
                }
                Token::Word("beginbfrange") => {
                    section = Section::Range;
                    pending.clear();
                }
                Token::Word("endbfchar" | "endbfrange") => {
                    section = Section::None;
                    pending.clear();
                }
                _ if section == Section::None => {}
                Token::Open => {
                    in_array = true;
                    pending.push(Token::Open);
                }
                Token::Close => {
                    in_array = false;
                    pending.push(Token::Close);
                    if section == Section::Range {
                        apply_range(&pending, &mut mappings)?;
                        pending.clear();
                    }
                }
                token => {
                    pending.push(token);
                    match section {
                        Section::Char if pending.len() == 2 => {
                            apply_char(&pending, &mut mappings);
                            pending.clear();
                        }
                        Section::Range if pending.len() == 3 && !in_array => {
                            apply_range(&pending, &mut mappings)?;
                            pending.clear();
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(Self { mappings })
    }

    /// Unicode text for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn tokenize(text: &str) -> Result<Vec<Token<'_>>, BackendError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if bytes.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if bytes.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = text[i + 1..]
                    .find('>')
                    .map(|e| i + 1 + e)
                    .ok_or_else(|| BackendError::Font("unterminated hex string in CMap".into()))?;
                tokens.push(Token::Hex(decode_hex(&text[i + 1..end])?));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b']' => {
                tokens.push(Token::Close);
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'<' | b'>' | b'[' | b']' | b'%')
                {
                    i += 1;
                }
                let word = &text[start..i];
                match word.parse::<u32>() {
                    Ok(n) => tokens.push(Token::Number(n)),
                    Err(_) => tokens.push(Token::Word(word)),
                }
            }
        }
    }

    Ok(tokens)
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, BackendError> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    for pair in digits.chunks(2) {
        let hi = hex_value(pair[0])?;
        // An odd trailing digit is padded with 0.
        let lo = match pair.get(1) {
            Some(&d) => hex_value(d)?,
            None => 0,
        };
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_value(digit: u8) -> Result<u8, BackendError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(BackendError::Font(format!(
            "invalid hex digit '{}' in CMap",
            digit as char
        ))),
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

/// UTF-16BE code units of destination bytes. A lone byte is one unit.
fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    if let [b] = bytes {
        return vec![u16::from(*b)];
    }
    bytes
        .chunks(2)
        .map(|c| u16::from_be_bytes([c[0], c.get(1).copied().unwrap_or(0)]))
        .collect()
}

fn utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn apply_char(pending: &[Token<'_>], mappings: &mut HashMap<u32, String>) {
    if let [Token::Hex(src), Token::Hex(dst)] = pending {
        mappings.insert(code_of(src), utf16be(dst));
    }
}

fn apply_range(
    pending: &[Token<'_>],
    mappings: &mut HashMap<u32, String>,
) -> Result<(), BackendError> {
    let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) = (pending.first(), pending.get(1)) else {
        return Ok(());
    };
    let (lo, hi) = (code_of(lo), code_of(hi));
    if hi < lo {
        return Err(BackendError::Font(format!(
            "bfrange end {hi:#x} precedes start {lo:#x}"
        )));
    }
    if hi - lo >= MAX_RANGE_LEN {
        tracing::warn!(lo, hi, "skipping oversized bfrange");
        return Ok(());
    }

    match &pending[2..] {
        // <lo> <hi> <dst>: increment the last UTF-16 unit across the range
        [Token::Hex(dst)] => {
            let mut units = utf16_units(dst);
            for code in lo..=hi {
                mappings.insert(code, String::from_utf16_lossy(&units));
                if let Some(last) = units.last_mut() {
                    *last = last.wrapping_add(1);
                }
            }
        }
        // <lo> <hi> [<d0> <d1> ...]
        [Token::Open, rest @ ..] => {
            let dsts = rest.iter().filter_map(|t| match t {
                Token::Hex(d) => Some(d),
                _ => None,
            });
            for (code, dst) in (lo..=hi).zip(dsts) {
                mappings.insert(code, utf16be(dst));
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let cmap = ToUnicodeCMap::parse(b"").unwrap();
        assert!(cmap.is_empty());
        assert_eq!(cmap.lookup(0x41), None);
    }

    #[test]
    fn bfchar_mappings() {
        let data = b"2 beginbfchar\n<0041> <0042>\n<03> <0053>\nendbfchar\n";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(0x41), Some("B"));
        assert_eq!(cmap.lookup(0x03), Some("S"));
        assert_eq!(cmap.len(), 2);
    }

    #[test]
    fn bfchar_entries_on_one_line() {
        let data = b"beginbfchar <01> <0043> <02> <0031> endbfchar";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(1), Some("C"));
        assert_eq!(cmap.lookup(2), Some("1"));
    }

    #[test]
    fn bfchar_ligature() {
        let data = b"beginbfchar\n<0012> <00660069>\nendbfchar";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(0x12), Some("fi"));
    }

    #[test]
    fn bfchar_surrogate_pair() {
        let data = b"beginbfchar\n<0001> <D83DDE00>\nendbfchar";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(1), Some("\u{1F600}"));
    }

    #[test]
    fn bfrange_incrementing() {
        let data = b"1 beginbfrange\n<0020> <0022> <0041>\nendbfrange";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(0x20), Some("A"));
        assert_eq!(cmap.lookup(0x21), Some("B"));
        assert_eq!(cmap.lookup(0x22), Some("C"));
        assert_eq!(cmap.lookup(0x23), None);
    }

    #[test]
    fn bfrange_array_form() {
        let data = b"beginbfrange\n<0005> <0007> [<0042> <0050> <0031>]\nendbfrange";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(5), Some("B"));
        assert_eq!(cmap.lookup(6), Some("P"));
        assert_eq!(cmap.lookup(7), Some("1"));
    }

    #[test]
    fn multiple_sections_and_noise() {
        let data = b"%!PS-Adobe-3.0 Resource-CMap\n\
            /CIDInit /ProcSet findresource begin\n\
            12 dict begin begincmap\n\
            /CMapName /Adobe-Identity-UCS def\n\
            1 begincodespacerange <0000> <FFFF> endcodespacerange\n\
            1 beginbfchar <0001> <0057> endbfchar\n\
            1 beginbfrange <0010> <0011> <0030> endbfrange\n\
            endcmap CMapName currentdict /CMap defineresource pop end end";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.lookup(1), Some("W"));
        assert_eq!(cmap.lookup(0x10), Some("0"));
        assert_eq!(cmap.lookup(0x11), Some("1"));
        // codespace bounds are not mappings
        assert_eq!(cmap.lookup(0), None);
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn invalid_hex_is_an_error() {
        let data = b"beginbfchar\n<00G1> <0041>\nendbfchar";
        assert!(ToUnicodeCMap::parse(data).is_err());
    }

    #[test]
    fn oversized_bfrange_is_skipped() {
        let data = b"beginbfrange\n<000000> <FFFFFF> <0041>\n<0001> <0002> <0058>\nendbfrange";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.len(), 2);
        assert_eq!(cmap.lookup(0), None);
        assert_eq!(cmap.lookup(1), Some("X"));
        assert_eq!(cmap.lookup(2), Some("Y"));
    }

    #[test]
    fn full_two_byte_bfrange_is_kept() {
        let data = b"beginbfrange\n<0000> <FFFF> <0000>\nendbfrange";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.len(), 0x1_0000);
        assert_eq!(cmap.lookup(0x41), Some("A"));
    }

    #[test]
    fn reversed_range_is_an_error() {
        let data = b"beginbfrange\n<0010> <0005> <0041>\nendbfrange";
        assert!(ToUnicodeCMap::parse(data).is_err());
    }
}
