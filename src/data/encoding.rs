use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TextEncoding – one decoding candidate
// ---------------------------------------------------------------------------

/// A text encoding the loader may try when decoding a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Strict UTF-8.
    Utf8,
    /// UTF-8 that must start with a byte-order mark, which is stripped.
    Utf8Sig,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// Windows-1252: Latin-1 with printable characters in 0x80..=0x9F.
    Windows1252,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Windows-1252 mapping for 0x80..=0x9F. `None` marks the five undefined bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None,             Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None,             Some('\u{017D}'), None,
    None,             Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None,             Some('\u{017E}'), Some('\u{0178}'),
];

impl TextEncoding {
    /// Order tried when the configuration does not name one.
    pub const DEFAULT_ORDER: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Utf8Sig,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM)?;
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
