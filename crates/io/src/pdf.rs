// PDF title metadata (Info dictionary /Title) via lopdf.
//
// The document is loaded, the single /Title entry is read or replaced, and
// the whole file is re-serialized. Nothing else in the document is touched.

use lopdf::{Dictionary, Document, Object, StringFormat};
use retitle_recon::{DocumentError, TitleStore};

/// `TitleStore` backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTitleStore;

impl TitleStore for PdfTitleStore {
    fn read_title(&self, content: &[u8]) -> Result<String, DocumentError> {
        let doc = load(content).map_err(DocumentError::Read)?;
        Ok(info_dict(&doc)
            .and_then(|info| info.get(b"Title").ok())
            .and_then(|title| title.as_str().ok())
            .map(decode_text_string)
            .unwrap_or_default())
    }

    fn write_title(&self, content: &[u8], title: &str) -> Result<Vec<u8>, DocumentError> {
        let mut doc = load(content).map_err(DocumentError::Write)?;
        set_title(&mut doc, title).map_err(DocumentError::Write)?;

        let mut out = Vec::with_capacity(content.len());
        doc.save_to(&mut out)
            .map_err(|e| DocumentError::Write(format!("cannot serialize PDF: {e}")))?;
        Ok(out)
    }
}

fn load(content: &[u8]) -> Result<Document, String> {
    let doc = Document::load_mem(content).map_err(|e| format!("cannot parse PDF: {e}"))?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err("document is encrypted".to_string());
    }
    Ok(doc)
}

/// The trailer's /Info, either inline or by reference.
fn info_dict(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn set_title(doc: &mut Document, title: &str) -> Result<(), String> {
    let value = encode_text_string(title);
    match doc.trailer.get(b"Info").ok().cloned() {
        Some(Object::Reference(id)) => {
            let info = doc
                .get_object_mut(id)
                .and_then(|obj| obj.as_dict_mut())
                .map_err(|e| format!("invalid Info dictionary: {e}"))?;
            info.set("Title", value);
        }
        Some(Object::Dictionary(mut info)) => {
            info.set("Title", value);
            doc.trailer.set("Info", info);
        }
        _ => {
            let mut info = Dictionary::new();
            info.set("Title", value);
            let id = doc.add_object(info);
            doc.trailer.set("Info", id);
        }
    }
    Ok(())
}

/// PDF text string to Rust string: UTF-16BE or UTF-8 when BOM-prefixed,
/// otherwise PDFDocEncoding (read as Latin-1, which agrees on printable ASCII
/// and the upper half).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// ASCII titles stay literal strings; anything else is UTF-16BE with BOM.
pub fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Minimal one-page document, optionally with an Info /Title.
    fn sample_pdf(title: Option<Object>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(title) = title {
            let info_id = doc.add_object(dictionary! { "Title" => title });
            doc.trailer.set("Info", info_id);
        }
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn reads_literal_title() {
        let pdf = sample_pdf(Some(Object::string_literal("Annual Report 2023")));
        assert_eq!(PdfTitleStore.read_title(&pdf).unwrap(), "Annual Report 2023");
    }

    #[test]
    fn missing_info_reads_as_empty() {
        let pdf = sample_pdf(None);
        assert_eq!(PdfTitleStore.read_title(&pdf).unwrap(), "");
    }

    #[test]
    fn write_then_read_back() {
        let pdf = sample_pdf(Some(Object::string_literal("old")));
        let updated = PdfTitleStore.write_title(&pdf, "annual_report_2023").unwrap();
        assert_eq!(PdfTitleStore.read_title(&updated).unwrap(), "annual_report_2023");
    }

    #[test]
    fn write_creates_info_when_absent() {
        let pdf = sample_pdf(None);
        let updated = PdfTitleStore.write_title(&pdf, "fresh").unwrap();
        assert_eq!(PdfTitleStore.read_title(&updated).unwrap(), "fresh");
    }

    #[test]
    fn non_ascii_title_uses_utf16() {
        let pdf = sample_pdf(None);
        let updated = PdfTitleStore.write_title(&pdf, "Rapport annuel é 2023").unwrap();
        assert_eq!(PdfTitleStore.read_title(&updated).unwrap(), "Rapport annuel é 2023");
    }

    #[test]
    fn garbage_is_a_read_error() {
        assert!(matches!(
            PdfTitleStore.read_title(b"not a pdf at all"),
            Err(DocumentError::Read(_))
        ));
        assert!(matches!(
            PdfTitleStore.write_title(b"", "x"),
            Err(DocumentError::Write(_))
        ));
    }

    #[test]
    fn decode_variants() {
        assert_eq!(decode_text_string(b"\xFE\xFF\x00A\x00\xE9"), "Aé");
        assert_eq!(decode_text_string(b"\xEF\xBB\xBFr\xC3\xA9"), "ré");
        assert_eq!(decode_text_string(b"caf\xE9"), "café");
    }

    #[test]
    fn encode_keeps_ascii_literal() {
        match encode_text_string("plain") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"plain".to_vec()),
            other => panic!("unexpected {other:?}"),
        }
        match encode_text_string("é") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9])
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
