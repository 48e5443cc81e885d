//! File-shaped handler outcomes.
//!
//! A [`NamedFile`] carries the open file handle plus the metadata the
//! coercion layer turns into headers: declared content type, byte size and
//! the download name. Disk I/O stays out of the dispatcher; bytes are
//! streamed as the transport drains the response.

use mime::Mime;
use std::io;
use std::path::Path;
use tokio::fs::File;

pub struct NamedFile {
    file: File,
    name: String,
    size: u64,
    content_type: Option<Mime>,
}

impl NamedFile {
    /// Opens a file and derives name, size and content type from the path.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());

        Ok(Self { file, name, size, content_type: content_type_of(path) })
    }

    /// Wraps an already-open file with explicit metadata.
    pub fn from_parts(file: File, name: impl Into<String>, size: u64) -> Self {
        Self { file, name: name.into(), size, content_type: None }
    }

    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub(crate) fn into_parts(self) -> (File, String, u64, Option<Mime>) {
        (self.file, self.name, self.size, self.content_type)
    }
}

impl std::fmt::Debug for NamedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Content type by file extension; `None` defaults to octet-stream at the
/// response layer.
pub(crate) fn content_type_of(path: &Path) -> Option<Mime> {
    let extension = path.extension()?.to_str()?;
    let mime = match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS,
        "js" | "mjs" => mime::TEXT_JAVASCRIPT,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "pdf" => mime::APPLICATION_PDF,
        "ico" => "image/x-icon".parse().ok()?,
        "wasm" => "application/wasm".parse().ok()?,
        "woff2" => "font/woff2".parse().ok()?,
        _ => return None,
    };
    Some(mime)
}
