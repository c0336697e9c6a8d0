//! Text decoding with a fixed encoding priority list.
//!
//! The first candidate that decodes the entire file without replacement
//! characters or NULs wins. UTF-16BE needs its byte-order mark; UTF-16LE is
//! also tried without one when the raw bytes contain NULs, which no
//! single-byte menu export does.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Candidate encodings, in priority order.
pub static CANDIDATES: [&Encoding; 4] = [UTF_8, UTF_16LE, UTF_16BE, WINDOWS_1252];

/// Decoded file contents plus the encoding that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Decode `bytes` with the default candidate list.
pub fn decode(bytes: &[u8]) -> Option<Decoded> {
    decode_with(&CANDIDATES, bytes)
}

/// Decode `bytes` trying each of `candidates` in order.
pub fn decode_with(candidates: &[&'static Encoding], bytes: &[u8]) -> Option<Decoded> {
    for &encoding in candidates {
        match try_decode(encoding, bytes) {
            Some(text) => {
                log::debug!("decoded {} bytes as {}", bytes.len(), encoding.name());
                return Some(Decoded { text, encoding });
            }
            None => log::debug!("{} rejected input", encoding.name()),
        }
    }
    None
}

/// Comma-separated candidate names, for error messages.
pub fn candidate_names(candidates: &[&'static Encoding]) -> String {
    candidates
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn try_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        // A BOM for a different encoding: let that candidate take it.
        Some(_) if encoding != WINDOWS_1252 => return None,
        None if encoding == UTF_16BE => return None,
        None if encoding == UTF_16LE && (!bytes.contains(&0) || bytes.len() % 2 != 0) => {
            return None
        }
        _ => bytes,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .filter(|text| !text.contains('\0'))
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le_with_bom(s: &str) -> Vec<u8> {
        let mut out = vec![0xFF, 0xFE];
        out.extend(s.encode_utf16().flat_map(u16::to_le_bytes));
        out
    }

    #[test]
    fn plain_utf8_wins_first() {
        let decoded = decode("name,calories\nMocha,250\n".as_bytes()).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert!(decoded.text.starts_with("name"));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let decoded = decode("\u{feff}name\nTea\n".as_bytes()).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "name\nTea\n");
    }

    #[test]
    fn utf16le_with_bom_decodes() {
        let decoded = decode(&utf16le_with_bom(",Calories\nCroissant,300\n")).unwrap();
        assert_eq!(decoded.encoding, UTF_16LE);
        assert_eq!(decoded.text, ",Calories\nCroissant,300\n");
    }

    #[test]
    fn utf16le_without_bom_is_not_read_as_utf8() {
        let bytes: Vec<u8> = "item_name,calories\nMocha,250\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, UTF_16LE);
        assert_eq!(decoded.text, "item_name,calories\nMocha,250\n");
    }

    #[test]
    fn nul_bytes_reject_single_byte_candidates() {
        assert!(decode_with(&[UTF_8, WINDOWS_1252], b"na\0me\n").is_none());
    }

    #[test]
    fn latin1_falls_through_to_windows_1252() {
        let bytes = b"name,calories\nCaf\xe9 Mocha,250\n";
        let decoded = decode(bytes).unwrap();
        assert_eq!(decoded.encoding, WINDOWS_1252);
        assert!(decoded.text.contains("Café Mocha"));
    }

    #[test]
    fn exhausting_candidates_yields_none() {
        assert!(decode_with(&[UTF_8], b"\xff\xfe\xfd").is_none());
        assert_eq!(candidate_names(&[UTF_8, WINDOWS_1252]), "UTF-8, windows-1252");
    }

    #[test]
    fn decoding_is_deterministic() {
        let bytes = b"name\nCaf\xe9\n";
        assert_eq!(decode(bytes), decode(bytes));
    }
}
