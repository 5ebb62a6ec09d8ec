//! Name canonicalization shared by the controller and the matcher.

const PDF_EXTENSION: &str = ".pdf";

/// Canonical display form of a file name: surrounding whitespace trimmed and
/// any trailing `.pdf` extension removed (ASCII case-insensitive).
///
/// Repeats until stable, so `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut s = raw.trim();
    while let Some(stem) = strip_pdf_extension(s) {
        s = stem.trim();
    }
    s.to_string()
}

fn strip_pdf_extension(s: &str) -> Option<&str> {
    let split = s.len().checked_sub(PDF_EXTENSION.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = s.split_at(split);
    ext.eq_ignore_ascii_case(PDF_EXTENSION).then_some(stem)
}

/// Matcher processing: lowercase, every non-alphanumeric char is a separator.
pub fn tokenize(s: &str) -> Vec<String> {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Token-sorted representation: tokens in lexicographic order, single-space joined.
pub fn sort_key(tokens: &[String]) -> String {
    let mut sorted: Vec<&str> = tokens.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}
