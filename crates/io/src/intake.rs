// Input collection: files and directories to PDF source files

use std::path::{Path, PathBuf};

use retitle_recon::SourceFile;

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Expand inputs (directories one level deep, sorted by name) and read every
/// PDF. Non-PDF files are skipped; unreadable inputs fail the whole intake.
pub fn collect_pdfs(inputs: &[PathBuf]) -> Result<Vec<SourceFile>, String> {
    let mut files = Vec::new();

    for input in inputs {
        for path in expand(input)? {
            if !is_pdf_path(&path) {
                log::debug!("intake: skipping non-PDF {}", path.display());
                continue;
            }
            let content = std::fs::read(&path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push(SourceFile::new(name, content));
        }
    }

    log::info!("intake: {} PDF files collected", files.len());
    Ok(files)
}

fn expand(input: &Path) -> Result<Vec<PathBuf>, String> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let entries = std::fs::read_dir(input)
        .map_err(|e| format!("cannot read directory {}: {e}", input.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("cannot read directory {}: {e}", input.display()))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extension_check() {
        assert!(is_pdf_path(Path::new("a.pdf")));
        assert!(is_pdf_path(Path::new("dir/A.PDF")));
        assert!(!is_pdf_path(Path::new("a.pdf.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn directory_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"B").unwrap();
        fs::write(dir.path().join("a.PDF"), b"A").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = collect_pdfs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(files[0].content, b"A");
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z.pdf");
        let a = dir.path().join("a.pdf");
        fs::write(&z, b"Z").unwrap();
        fs::write(&a, b"A").unwrap();

        let files = collect_pdfs(&[z, a]).unwrap();
        assert_eq!(files[0].name, "z.pdf");
        assert_eq!(files[1].name, "a.pdf");
    }

    #[test]
    fn missing_pdf_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(collect_pdfs(&[dir.path().join("gone.pdf")]).is_err());
    }
}
