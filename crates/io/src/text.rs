// Text file decoding

use std::path::Path;

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(decode_utf8_or_1252(bytes))
}

/// UTF-8 (BOM stripped) first; on failure fall back to Windows-1252,
/// which is what spreadsheet tools usually export.
pub fn decode_utf8_or_1252(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => s,
        },
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode_utf8_or_1252("résumé".as_bytes().to_vec()), "résumé");
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"annual_report");
        assert_eq!(decode_utf8_or_1252(bytes), "annual_report");
    }

    #[test]
    fn windows_1252_fallback() {
        // 0xE9 = é in Windows-1252, invalid as a lone UTF-8 byte
        assert_eq!(decode_utf8_or_1252(vec![b'r', 0xE9, b's']), "rés");
    }
}
