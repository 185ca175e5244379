use std::io::{Cursor, Write};

use generation_client::ProjectFile;
use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Fixed archive entry holding the preview document.
pub const PREVIEW_ENTRY: &str = "preview.html";

/// Fixed archive entry listing exported paths and languages.
pub const MANIFEST_ENTRY: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("artifact path '{0}' escapes the archive root")]
    UnsafePath(String),

    #[error("failed to format export timestamp: {0}")]
    ClockFormat(#[source] time::error::Format),
}

/// A packaged export: collision-free archive file name plus raw ZIP bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    exported_at: String,
    preview: &'static str,
    files: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    path: String,
    language: String,
}

/// Packages the current artifact set and preview document into a ZIP
/// archive. Pure function of its inputs; no session state is touched and
/// failures carry no side effects.
pub fn export_archive(
    files: &[ProjectFile],
    preview_html: &str,
) -> Result<ExportArchive, ExportError> {
    let exported_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(ExportError::ClockFormat)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        let path = normalize_entry_path(&file.name)?;
        writer.start_file(path.as_str(), options)?;
        writer.write_all(file.content.as_bytes())?;
        entries.push(ManifestEntry {
            path,
            language: file.language.clone(),
        });
    }

    writer.start_file(PREVIEW_ENTRY, options)?;
    writer.write_all(preview_html.as_bytes())?;

    let manifest = Manifest {
        exported_at: exported_at.clone(),
        preview: PREVIEW_ENTRY,
        files: entries,
    };
    writer.start_file(MANIFEST_ENTRY, options)?;
    writer.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    let bytes = writer.finish()?.into_inner();
    Ok(ExportArchive {
        file_name: archive_file_name(&exported_at),
        bytes,
    })
}

/// Normalizes an artifact path for the archive: backslashes become slashes,
/// leading slashes and `.`/empty segments are stripped, and `..` segments
/// are refused.
pub fn normalize_entry_path(name: &str) -> Result<String, ExportError> {
    let slashed = name.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ExportError::UnsafePath(name.to_string())),
            segment => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return Err(ExportError::UnsafePath(name.to_string()));
    }

    Ok(segments.join("/"))
}

fn archive_file_name(exported_at: &str) -> String {
    let sanitized: String = exported_at
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect();
    format!("appforge-export-{sanitized}.zip")
}
