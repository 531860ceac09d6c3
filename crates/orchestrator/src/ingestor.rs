//! Content ingestion: turns any payload into text the prompt can carry.

use std::collections::BTreeSet;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assist_core::{
    ContentPayload, ContentType, ExtractionService, ImageFormat, PipelineError, UploadedFile,
};
use encoding_rs::GBK;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::config::AssistConfig;

/// Text produced by ingestion, ready for prompt building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedContent {
    /// Type the payload was ingested as.
    pub content_type: ContentType,
    /// Where the content came from, as shown to the model.
    pub source: String,
    /// Plain text passed through unchanged (text payloads only).
    pub raw_text: Option<String>,
    /// Text read from files or extracted remotely.
    pub context_text: Option<String>,
    /// Whether at least one remote extraction happened.
    pub used_remote_ingestion: bool,
}

impl IngestedContent {
    fn text(text: String) -> Self {
        Self {
            content_type: ContentType::Text,
            source: "clipboard text".to_string(),
            raw_text: Some(text),
            context_text: None,
            used_remote_ingestion: false,
        }
    }

    /// Length in chars of whichever text this carries.
    pub fn text_len(&self) -> usize {
        self.raw_text
            .as_deref()
            .or(self.context_text.as_deref())
            .map(|t| t.chars().count())
            .unwrap_or(0)
    }
}

/// A temporary image file that is deleted when dropped.
///
/// Deletion failures are logged and never returned.
struct TempImage {
    path: Option<TempPath>,
}

impl TempImage {
    async fn write(data: &[u8], format: ImageFormat) -> Result<Self, PipelineError> {
        let suffix = format!(".{}", format.extension());
        let temp = tempfile::Builder::new()
            .prefix("doubletap-image-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| {
                PipelineError::UploadFailed(format!("cannot create temporary image: {}", e))
            })?
            .into_temp_path();

        // Take ownership first so a failed write still removes the file.
        let image = Self { path: Some(temp) };
        tokio::fs::write(image.path(), data).await.map_err(|e| {
            PipelineError::UploadFailed(format!("cannot write temporary image: {}", e))
        })?;

        debug!("Wrote {} byte image to temporary file", data.len());
        Ok(image)
    }

    fn path(&self) -> &Path {
        match &self.path {
            Some(path) => path,
            None => Path::new(""),
        }
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => debug!("Removed temporary image {}", shown),
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary image {}: {}", shown, e),
        }
    }
}

/// Converts payloads to text, uploading files and images for extraction
/// when they cannot be read locally.
pub struct ContentIngestor {
    extraction: Arc<dyn ExtractionService>,
    text_extensions: BTreeSet<String>,
    delete_remote_files: bool,
}

impl ContentIngestor {
    /// Create an ingestor with the default text allowlist.
    pub fn new(extraction: Arc<dyn ExtractionService>) -> Self {
        Self::from_config(extraction, &AssistConfig::default())
    }

    /// Create an ingestor using the allowlist and cleanup policy from `config`.
    pub fn from_config(extraction: Arc<dyn ExtractionService>, config: &AssistConfig) -> Self {
        Self {
            extraction,
            text_extensions: config.text_extensions.clone(),
            delete_remote_files: config.delete_remote_files,
        }
    }

    /// Ingest a classified payload.
    ///
    /// Text passes through without any I/O. Files are checked for
    /// existence before anything is uploaded. Images go through a
    /// temporary file that is gone by the time this returns.
    pub async fn ingest(
        &self,
        payload: ContentPayload,
        content_type: ContentType,
    ) -> Result<IngestedContent, PipelineError> {
        let ingested = match (payload, content_type) {
            (ContentPayload::Text { text }, ContentType::Text) => IngestedContent::text(text),
            (ContentPayload::FilePaths { paths }, ContentType::FilePaths) => {
                self.ingest_files(&paths).await?
            }
            (ContentPayload::Image { data, format }, ContentType::Image) => {
                self.ingest_image(&data, format).await?
            }
            (payload, content_type) => {
                return Err(PipelineError::UnsupportedType(format!(
                    "cannot ingest {} as {}",
                    payload.describe(),
                    content_type
                )));
            }
        };

        info!(
            "Ingestion done: {} from {} ({} chars, remote: {})",
            ingested.content_type,
            ingested.source,
            ingested.text_len(),
            ingested.used_remote_ingestion
        );

        Ok(ingested)
    }

    async fn ingest_files(&self, paths: &[PathBuf]) -> Result<IngestedContent, PipelineError> {
        for path in paths {
            check_file(path).await?;
        }

        let mut used_remote = false;
        let mut sections = Vec::with_capacity(paths.len());
        for path in paths {
            let (text, remote) = self.read_file(path).await?;
            used_remote |= remote;
            sections.push((file_name(path), text));
        }

        let (source, context) = match sections.as_slice() {
            [(name, text)] => (format!("file ({})", name), text.clone()),
            _ => {
                let combined = sections
                    .iter()
                    .map(|(name, text)| format!("--- {} ---\n{}", name, text))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (format!("{} files", sections.len()), combined)
            }
        };

        Ok(IngestedContent {
            content_type: ContentType::FilePaths,
            source,
            raw_text: None,
            context_text: Some(context),
            used_remote_ingestion: used_remote,
        })
    }

    /// Read one file, locally when its extension allows it.
    async fn read_file(&self, path: &Path) -> Result<(String, bool), PipelineError> {
        let local = path
            .extension()
            .map(|e| self.text_extensions.contains(&e.to_string_lossy().to_lowercase()))
            .unwrap_or(false);

        if local {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| map_read_error(path, e))?;
            match decode_local(bytes) {
                Some(text) => {
                    debug!("Read {} locally ({} bytes)", path.display(), text.len());
                    return Ok((text, false));
                }
                None => {
                    info!(
                        "{} is neither UTF-8 nor GBK, falling back to remote extraction",
                        path.display()
                    );
                }
            }
        }

        let text = self.extract_remote(path).await?;
        Ok((text, true))
    }

    async fn ingest_image(
        &self,
        data: &[u8],
        format: ImageFormat,
    ) -> Result<IngestedContent, PipelineError> {
        let image = TempImage::write(data, format).await?;
        let result = self.extract_remote(image.path()).await;
        drop(image);

        Ok(IngestedContent {
            content_type: ContentType::Image,
            source: "clipboard image".to_string(),
            raw_text: None,
            context_text: Some(result?),
            used_remote_ingestion: true,
        })
    }

    /// Upload, fetch extracted text, then delete the remote copy.
    async fn extract_remote(&self, path: &Path) -> Result<String, PipelineError> {
        debug!(
            "Uploading {} to {} for extraction",
            path.display(),
            self.extraction.name()
        );
        let uploaded = self.extraction.upload(path).await?;
        let text = self.extraction.extracted_text(&uploaded).await;
        self.cleanup_remote(&uploaded).await;

        let text = text?;
        if text.trim().is_empty() {
            return Err(PipelineError::ExtractionEmpty(format!(
                "no text could be extracted from {}",
                uploaded.filename
            )));
        }
        Ok(text)
    }

    async fn cleanup_remote(&self, uploaded: &UploadedFile) {
        if !self.delete_remote_files {
            return;
        }
        if let Err(e) = self.extraction.delete(uploaded).await {
            warn!(
                "Failed to delete remote file {}: {}",
                uploaded.remote_id, e
            );
        }
    }
}

async fn check_file(path: &Path) -> Result<(), PipelineError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    if !metadata.is_file() {
        return Err(PipelineError::UnsupportedType(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    Ok(())
}

/// Decode a local text file as UTF-8, then GBK.
fn decode_local(bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => GBK
            .decode_without_bom_handling_and_without_replacement(e.as_bytes())
            .map(|text| text.into_owned()),
    }
}

fn map_read_error(path: &Path, e: std::io::Error) -> PipelineError {
    if e.kind() == IoErrorKind::NotFound {
        PipelineError::FileNotFound(path.display().to_string())
    } else {
        PipelineError::UploadFailed(format!("cannot read {}: {}", path.display(), e))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
