//! Character code encoding of text.

use serde::Serialize;

/// One character with its numeric code in decimal, binary and hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedChar {
    pub ch: char,
    pub code: u32,
    /// At least 8 binary digits, zero padded.
    pub binary: String,
    /// Uppercase, at least 2 hex digits.
    pub hex: String,
}

/// Encode every character of `text` in order.
pub fn encode_text(text: &str) -> Vec<EncodedChar> {
    text.chars()
        .map(|ch| {
            let code = ch as u32;
            EncodedChar {
                ch,
                code,
                binary: format!("{:08b}", code),
                hex: format!("{:02X}", code),
            }
        })
        .collect()
}
