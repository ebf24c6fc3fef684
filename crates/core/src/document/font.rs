//! Just enough font handling to decode shown strings and measure them.
//!
//! Text is decoded through `lopdf`'s encoding support (simple encodings and
//! ToUnicode maps). Glyph advances come from `/Widths` for simple fonts and
//! `/W` + `/DW` for Type0 fonts; anything unknown falls back to half an em.

use lopdf::{Dictionary, Document, Encoding, Object};
use rustc_hash::FxHashMap;
use tracing::warn;

use super::objects::{as_number, get_array, get_dict, get_name, get_number, resolve, resolve_dict};

/// Advance used when a font gives no width for a code, in 1/1000 em.
const FALLBACK_WIDTH: f64 = 500.0;
/// Default `/DW` for CID fonts.
const CID_DEFAULT_WIDTH: f64 = 1000.0;
const DEFAULT_ASCENT: f64 = 800.0;
const DEFAULT_DESCENT: f64 = -200.0;
/// Longest `c_first c_last w` range expanded from a `/W` array.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// Decoding and metrics for one font resource.
pub(crate) struct PageFont<'a> {
    encoding: Option<Encoding<'a>>,
    two_byte: bool,
    widths: FxHashMap<u32, f64>,
    default_width: f64,
    /// Ascent and descent in 1/1000 em.
    pub ascent: f64,
    pub descent: f64,
}

impl<'a> PageFont<'a> {
    pub fn new(doc: &'a Document, font: &'a Dictionary) -> Self {
        let two_byte = get_name(doc, font, b"Subtype") == Some(b"Type0".as_slice());
        let encoding = match font.get_font_encoding(doc) {
            Ok(encoding) => Some(encoding),
            Err(e) => {
                warn!(error = %e, "font encoding unavailable, falling back to Latin-1");
                None
            }
        };

        let metrics_dict = if two_byte {
            get_array(doc, font, b"DescendantFonts")
                .and_then(|kids| kids.first())
                .and_then(|kid| resolve_dict(doc, kid))
                .unwrap_or(font)
        } else {
            font
        };

        let (widths, default_width) = if two_byte {
            (
                cid_widths(doc, metrics_dict),
                get_number(doc, metrics_dict, b"DW").unwrap_or(CID_DEFAULT_WIDTH),
            )
        } else {
            let missing = get_dict(doc, metrics_dict, b"FontDescriptor")
                .and_then(|d| get_number(doc, d, b"MissingWidth"))
                .filter(|w| *w > 0.0)
                .unwrap_or(FALLBACK_WIDTH);
            (simple_widths(doc, metrics_dict), missing)
        };

        let descriptor = get_dict(doc, metrics_dict, b"FontDescriptor");
        let ascent = descriptor
            .and_then(|d| get_number(doc, d, b"Ascent"))
            .filter(|a| *a > 0.0)
            .unwrap_or(DEFAULT_ASCENT);
        let descent = descriptor
            .and_then(|d| get_number(doc, d, b"Descent"))
            .filter(|d| *d < 0.0)
            .unwrap_or(DEFAULT_DESCENT);

        Self {
            encoding,
            two_byte,
            widths,
            default_width,
            ascent,
            descent,
        }
    }

    /// Splits a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Advance of `code` in 1/1000 em.
    pub fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    /// Word spacing applies to single-byte code 32 only.
    pub fn is_word_space(&self, code: u32) -> bool {
        !self.two_byte && code == 32
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        if let Some(encoding) = &self.encoding
            && let Ok(text) = Document::decode_text(encoding, bytes)
        {
            return text;
        }
        if self.two_byte {
            return String::new();
        }
        bytes.iter().map(|b| char::from(*b)).collect()
    }
}

fn simple_widths(doc: &Document, font: &Dictionary) -> FxHashMap<u32, f64> {
    let first = get_number(doc, font, b"FirstChar").unwrap_or(0.0).max(0.0) as u32;
    get_array(doc, font, b"Widths")
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, w)| Some((first + i as u32, resolve(doc, w).and_then(as_number)?)))
        .collect()
}

/// Parses a CID `/W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
fn cid_widths(doc: &Document, font: &Dictionary) -> FxHashMap<u32, f64> {
    let mut widths = FxHashMap::default();
    let Some(items) = get_array(doc, font, b"W") else {
        return widths;
    };

    let mut i = 0;
    while i < items.len() {
        let Some(start) = resolve(doc, &items[i]).and_then(as_number) else {
            break;
        };
        let start = start as u32;
        match items.get(i + 1).and_then(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    if let Some(w) = resolve(doc, w).and_then(as_number) {
                        widths.insert(start + offset as u32, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let end = as_number(end).map(|e| e as u32);
                let w = items.get(i + 2).and_then(|o| resolve(doc, o)).and_then(as_number);
                let (Some(end), Some(w)) = (end, w) else {
                    break;
                };
                for code in start..=end.clamp(start, start.saturating_add(MAX_RANGE_SPAN)) {
                    widths.insert(code, w);
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}
