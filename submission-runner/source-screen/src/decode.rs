//! Text loading for student sources, which arrive in whatever encoding the
//! student's editor produced.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Utf8,
    Utf16,
    Latin1,
}

/// Tried in order; Latin-1 accepts every byte sequence so it always ends the search.
pub const DEFAULT_ENCODINGS: [TextEncoding; 3] =
    [TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Latin1];

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            TextEncoding::Utf16 => decode_utf16(bytes),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        _ => return None,
    };
    if body.len() % 2 != 0 {
        return None;
    }

    let units = body.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

/// Decode `bytes` with the first encoding in `order` that accepts them.
pub fn decode(bytes: &[u8], order: &[TextEncoding]) -> Option<(String, TextEncoding)> {
    order
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (text, *encoding)))
}

/// Read a source file, trying each encoding in `order`.
pub fn read_source(path: impl AsRef<Path>, order: &[TextEncoding]) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::from_read(path, e))?;

    let (text, encoding) = decode(&bytes, order).ok_or_else(|| Error::Decode(path.to_path_buf()))?;
    debug!("Decoded {} as {:?}", path.display(), encoding);
    Ok(text)
}

/// Read a UTF-8 text file as lines.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
    Ok(text.lines().map(str::to_string).collect())
}
