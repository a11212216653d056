//! Byte-order-mark aware decoding of source text.

use widestring::U16Str;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode source file bytes into text.
///
/// A UTF-8 BOM is stripped, UTF-16 BOMs (either byte order) switch to UTF-16 decoding, and
/// everything else is read as UTF-8. Invalid sequences become U+FFFD; an odd trailing byte
/// in UTF-16 input is dropped.
#[must_use]
pub fn decode_source_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return U16Str::from_slice(&units).to_string_lossy();
    }

    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return U16Str::from_slice(&units).to_string_lossy();
    }

    String::from_utf8_lossy(bytes).into_owned()
}
