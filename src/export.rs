//! Export surface: per-invoice file naming and the zip sink that collects
//! finished documents for download.

use std::io::{Cursor, Write};

use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Turn an invoice number into a safe archive entry name: runs outside
/// `[A-Za-z0-9_.-]` become `_`, capped at 80 characters, `"invoice"` when
/// nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let re = Regex::new(r"[^A-Za-z0-9_.\-]+").expect("filename regex");
    let cleaned = re.replace_all(name.trim(), "_");
    let truncated: String = cleaned.chars().take(80).collect();
    if truncated.is_empty() {
        "invoice".to_string()
    } else {
        truncated
    }
}

/// In-memory zip archive of rendered invoices. Entries are written one at a
/// time; unique names are the caller's responsibility.
pub struct InvoiceBundle {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl InvoiceBundle {
    pub fn new() -> Self {
        InvoiceBundle {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add one completed document under the given entry name.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), String> {
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.writer
            .start_file(name, opts)
            .map_err(|e| format!("Could not start zip entry '{}': {}", name, e))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| format!("Could not write zip entry '{}': {}", name, e))?;
        Ok(())
    }

    /// Finish the archive and hand back its bytes.
    pub fn finish(self) -> Result<Vec<u8>, String> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| format!("Could not finish zip archive: {}", e))?;
        Ok(cursor.into_inner())
    }
}

impl Default for InvoiceBundle {
    fn default() -> Self {
        Self::new()
    }
}
