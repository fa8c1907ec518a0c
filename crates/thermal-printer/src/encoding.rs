//! Single-byte text encodings for printer firmware
//!
//! Thermal printers interpret each byte through their active code page, so
//! text has to be narrowed to one byte per character before it is sent.
//! ASCII passes through unchanged in every encoding; characters the chosen
//! code page cannot represent are replaced with `?`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Byte sent in place of an unmappable character
const REPLACEMENT: u8 = b'?';

/// Upper half (0x80-0xFF) of IBM code page 437, in byte order
const CP437_HIGH: &str = concat!(
    "ÇüéâäàåçêëèïîìÄÅ",
    "ÉæÆôöòûùÿÖÜ¢£¥₧ƒ",
    "áíóúñÑªº¿⌐¬½¼¡«»",
    "░▒▓│┤╡╢╖╕╣║╗╝╜╛┐",
    "└┴┬├─┼╞╟╚╔╩╦╠═╬╧",
    "╨╤╥╙╘╒╓╫╪┘┌█▄▌▐▀",
    "αßΓπΣσµτΦΘΩδ∞φε∩",
    "≡±≥≤⌠⌡÷≈°∙·√ⁿ²■\u{00A0}",
);

/// Text encoding used by `print_text` for string payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// IBM PC code page 437, the power-on default of most ESC/POS firmware
    #[default]
    Cp437,
    /// ISO-8859-1
    Latin1,
    /// 7-bit ASCII only
    Ascii,
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Cp437 => "cp437",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Encode a string, one byte per character
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        let mut unmapped = 0usize;
        for ch in text.chars() {
            match self.encode_char(ch) {
                Some(byte) => out.push(byte),
                None => {
                    unmapped += 1;
                    out.push(REPLACEMENT);
                }
            }
        }
        if unmapped > 0 {
            warn!(
                "{} character(s) not representable in {}, replaced with '?'",
                unmapped,
                self.name()
            );
        }
        out
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        let code = ch as u32;
        if code < 0x80 {
            return Some(code as u8);
        }
        match self {
            TextEncoding::Cp437 => CP437_HIGH
                .chars()
                .position(|c| c == ch)
                .map(|i| 0x80 + i as u8),
            TextEncoding::Latin1 if code <= 0xFF => Some(code as u8),
            TextEncoding::Latin1 | TextEncoding::Ascii => None,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cp437" | "pc437" => Ok(TextEncoding::Cp437),
            "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "ascii" => Ok(TextEncoding::Ascii),
            other => Err(format!(
                "unknown encoding '{}' (expected cp437, latin1 or ascii)",
                other
            )),
        }
    }
}
