//! Extension-to-encoding and extension-to-MIME lookup tables.
//!
//! Both tables are keyed by the lowercased final extension including its dot
//! (`.html`, `.tar.gz` keys on `.gz`). Registrations may override either
//! table; the defaults cover the common web asset types.

use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;

/// How file content is read off disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Read as UTF-8 text; invalid UTF-8 is a read failure.
    Utf8,
    /// Read as raw bytes.
    Binary,
}

/// Encoding and MIME lookups shared by a directory registration.
#[derive(Debug, Clone)]
pub struct MediaTypes {
    encodings: HashMap<String, ContentEncoding>,
    mime_types: HashMap<String, String>,
}

impl Default for MediaTypes {
    fn default() -> Self {
        let encodings = [".html", ".js", ".css"]
            .into_iter()
            .map(|ext| (ext.to_string(), ContentEncoding::Utf8))
            .collect();

        let mime_types = [
            (".html", "text/html"),
            (".js", "text/javascript"),
            (".css", "text/css"),
            (".csv", "text/csv"),
            (".xml", "text/xml"),
            (".md", "text/markdown"),
            (".gif", "image/gif"),
            (".jpg", "image/jpeg"),
            (".jpeg", "image/jpeg"),
            (".png", "image/png"),
            (".svg", "image/svg+xml"),
            (".tiff", "image/tiff"),
            (".webp", "image/webp"),
            (".mp4", "video/mp4"),
            (".ogg", "video/ogg"),
            (".webm", "video/webm"),
            (".flv", "video/flv"),
            (".3gpp", "video/3gpp"),
            (".3gp", "video/3gpp"),
            (".3gpp2", "video/3gpp2"),
            (".3g2", "video/3gpp2"),
            (".aac", "audio/aac"),
            (".mp3", "audio/mpeg"),
            (".wav", "audio/vnd.wave"),
            (".json", "application/json"),
            (".pdf", "application/pdf"),
            (".zip", "application/zip"),
        ]
        .into_iter()
        .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
        .collect();

        Self {
            encodings,
            mime_types,
        }
    }
}

impl MediaTypes {
    /// Tables with no entries; everything reads as binary with no MIME type.
    pub fn empty() -> Self {
        Self {
            encodings: HashMap::new(),
            mime_types: HashMap::new(),
        }
    }

    /// Override or add an encoding entry.
    pub fn with_encoding(mut self, ext: impl Into<String>, encoding: ContentEncoding) -> Self {
        self.encodings.insert(ext.into(), encoding);
        self
    }

    /// Override or add a MIME entry.
    pub fn with_mime(mut self, ext: impl Into<String>, mime: impl Into<String>) -> Self {
        self.mime_types.insert(ext.into(), mime.into());
        self
    }

    pub fn encoding_for(&self, ext: &str) -> ContentEncoding {
        self.encodings
            .get(ext)
            .copied()
            .unwrap_or(ContentEncoding::Binary)
    }

    pub fn mime_for(&self, ext: &str) -> Option<&str> {
        self.mime_types.get(ext).map(String::as_str)
    }
}

/// Final extension of a file name, lowercased, including the dot.
/// `archive.tar.gz` yields `.gz`; a name without one yields `None`.
pub fn extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx + 1 == name.len() {
        return None;
    }
    Some(name[idx..].to_lowercase())
}

/// Extension of a path's file name.
pub fn path_extension(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(extension)
}

/// Read a file with the given encoding.
pub async fn read_file(path: &Path, encoding: ContentEncoding) -> std::io::Result<Bytes> {
    match encoding {
        ContentEncoding::Utf8 => {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(Bytes::from(text))
        }
        ContentEncoding::Binary => {
            let raw = tokio::fs::read(path).await?;
            Ok(Bytes::from(raw))
        }
    }
}
