// Zip packaging of renamed documents

use std::io::{Cursor, Write};

use retitle_recon::ArchiveEntry;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack entries into an in-memory deflate zip, in the given order.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>, String> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .map_err(|e| format!("cannot add '{}' to archive: {e}", entry.name))?;
        zip.write_all(&entry.content)
            .map_err(|e| format!("cannot write '{}' to archive: {e}", entry.name))?;
    }

    let cursor = zip.finish().map_err(|e| format!("cannot finish archive: {e}"))?;
    log::debug!("archive: {} entries packed", entries.len());
    Ok(cursor.into_inner())
}
