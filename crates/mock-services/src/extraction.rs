//! Scripted extraction service.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use assist_core::{async_trait, ExtractionService, PipelineError, UploadedFile};

/// What a [`ScriptedExtraction`] does when asked.
#[derive(Debug, Clone)]
pub enum ExtractionBehavior {
    /// Every file extracts to this text.
    Text(String),
    /// Every file extracts to its own bytes, decoded lossily as UTF-8.
    FileContents,
    /// Extraction succeeds with an empty body.
    Empty,
    /// The upload itself fails.
    UploadFails(String),
    /// Upload succeeds but fetching the content fails.
    ContentFails(String),
}

/// One observed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Path handed to `upload`.
    pub path: PathBuf,
    /// Whether the path existed at upload time.
    pub existed: bool,
    /// File size at upload time (0 if missing).
    pub bytes: u64,
}

/// An extraction service driven by a fixed [`ExtractionBehavior`].
#[derive(Debug)]
pub struct ScriptedExtraction {
    behavior: ExtractionBehavior,
    fail_deletes: bool,
    uploads: Mutex<Vec<UploadRecord>>,
    content_calls: AtomicUsize,
    deletes: AtomicUsize,
}

impl ScriptedExtraction {
    /// Create a service with the given behavior.
    pub fn new(behavior: ExtractionBehavior) -> Self {
        Self {
            behavior,
            fail_deletes: false,
            uploads: Mutex::new(Vec::new()),
            content_calls: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Shorthand for [`ExtractionBehavior::Text`].
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(ExtractionBehavior::Text(text.into()))
    }

    /// Shorthand for [`ExtractionBehavior::Empty`].
    pub fn empty() -> Self {
        Self::new(ExtractionBehavior::Empty)
    }

    /// Make every remote delete fail.
    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Uploads received, in order.
    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Number of upload calls.
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().map(|u| u.len()).unwrap_or(0)
    }

    /// Number of content fetch calls.
    pub fn content_count(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    /// Number of delete calls.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.upload_count() + self.content_count() + self.delete_count()
    }
}

#[async_trait]
impl ExtractionService for ScriptedExtraction {
    async fn upload(&self, path: &Path) -> Result<UploadedFile, PipelineError> {
        let metadata = std::fs::metadata(path).ok();
        let record = UploadRecord {
            path: path.to_path_buf(),
            existed: metadata.is_some(),
            bytes: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
        };

        let index = {
            let mut uploads = self
                .uploads
                .lock()
                .map_err(|_| PipelineError::UploadFailed("mock state poisoned".to_string()))?;
            uploads.push(record.clone());
            uploads.len()
        };

        if let ExtractionBehavior::UploadFails(message) = &self.behavior {
            return Err(PipelineError::UploadFailed(message.clone()));
        }
        if !record.existed {
            return Err(PipelineError::FileNotFound(path.display().to_string()));
        }

        Ok(UploadedFile {
            remote_id: format!("file-{}", index),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: record.bytes,
        })
    }

    async fn extracted_text(&self, file: &UploadedFile) -> Result<String, PipelineError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            ExtractionBehavior::Text(text) => Ok(text.clone()),
            ExtractionBehavior::Empty => Ok(String::new()),
            ExtractionBehavior::ContentFails(message) => {
                Err(PipelineError::UploadFailed(message.clone()))
            }
            ExtractionBehavior::UploadFails(message) => {
                Err(PipelineError::UploadFailed(message.clone()))
            }
            ExtractionBehavior::FileContents => {
                let path = self
                    .uploads()
                    .into_iter()
                    .find(|u| {
                        u.path.file_name().map(|n| n.to_string_lossy().into_owned())
                            == Some(file.filename.clone())
                    })
                    .map(|u| u.path)
                    .ok_or_else(|| PipelineError::UploadFailed(file.remote_id.clone()))?;
                let bytes = std::fs::read(&path)
                    .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    async fn delete(&self, file: &UploadedFile) -> Result<(), PipelineError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes {
            return Err(PipelineError::UploadFailed(format!(
                "cannot delete {}",
                file.remote_id
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ScriptedExtraction"
    }
}
