//! KimiClient implementation using the Moonshot HTTP API.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use assist_core::{
    async_trait, CompletionRequest, CompletionResponse, CompletionService, ExtractionService,
    ImageFormat, PipelineError, UploadedFile,
};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{
    describe_error, ChatCompletionRequest, ChatCompletionResponse, FileContent, FileObject,
};
use crate::config::KimiConfig;

/// Upload purpose that asks the service to extract text.
const FILE_EXTRACT_PURPOSE: &str = "file-extract";

/// HTTP client for the Moonshot/Kimi API.
///
/// Each method performs exactly one request; nothing is retried.
#[derive(Debug, Clone)]
pub struct KimiClient {
    client: Client,
    config: KimiConfig,
}

impl KimiClient {
    /// Create a new KimiClient with the given configuration.
    pub fn new(config: KimiConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::ApiCallFailed(format!("Failed to create HTTP client: {}", e)))?;

        info!("KimiClient initialized for {}", config.api_url);

        Ok(Self { client, config })
    }

    /// Create a KimiClient from environment variables.
    ///
    /// See [`KimiConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::new(KimiConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &KimiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, PipelineError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PipelineError::ApiKeyMissing("KIMI_API_KEY not set".to_string()))
    }

    /// Make a chat completion request.
    async fn chat_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<ChatCompletionResponse, PipelineError> {
        let api_key = self.api_key()?;
        let url = self.config.endpoint("chat/completions");

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            "Sending completion request to {} (model: {}, messages: {})",
            url,
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::ApiCallFailed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::ApiCallFailed(describe_error(
                status.as_u16(),
                &error_text,
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::MalformedResponse(format!("Failed to parse response: {}", e)))
    }

    /// Upload a file with `purpose=file-extract`.
    async fn upload_file(&self, path: &Path) -> Result<FileObject, PipelineError> {
        let api_key = self.api_key()?;

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            IoErrorKind::NotFound => PipelineError::FileNotFound(path.display().to_string()),
            _ => PipelineError::UploadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )),
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut part = Part::bytes(bytes).file_name(filename.clone());
        if let Some(format) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
        {
            part = part
                .mime_str(format.mime_type())
                .map_err(|e| PipelineError::UploadFailed(format!("Invalid MIME type: {}", e)))?;
        }

        let form = Form::new()
            .text("purpose", FILE_EXTRACT_PURPOSE)
            .part("file", part);

        let url = self.config.endpoint("files");
        debug!("Uploading {} to {}", filename, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::UploadFailed(format!("Failed to upload {}: {}", filename, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::UploadFailed(describe_error(
                status.as_u16(),
                &error_text,
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::UploadFailed(format!("Failed to parse upload response: {}", e)))
    }

    /// Fetch the extracted content body for an uploaded file.
    async fn file_content(&self, file_id: &str) -> Result<String, PipelineError> {
        let api_key = self.api_key()?;
        let url = self.config.endpoint(&format!("files/{}/content", file_id));

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| {
                PipelineError::UploadFailed(format!("Failed to fetch content of {}: {}", file_id, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PipelineError::UploadFailed(format!("Failed to read content of {}: {}", file_id, e))
        })?;

        if !status.is_success() {
            return Err(PipelineError::UploadFailed(describe_error(
                status.as_u16(),
                &body,
            )));
        }

        Ok(FileContent::text_from_body(&body))
    }

    /// Delete an uploaded file.
    async fn delete_file(&self, file_id: &str) -> Result<(), PipelineError> {
        let api_key = self.api_key()?;
        let url = self.config.endpoint(&format!("files/{}", file_id));

        let response = self
            .client
            .delete(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| PipelineError::UploadFailed(format!("Failed to delete {}: {}", file_id, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::UploadFailed(describe_error(
                status.as_u16(),
                &error_text,
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CompletionService for KimiClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        let completion = self.chat_completion(&request).await?;
        debug!("Received completion {} from {}", completion.id, completion.model);
        Ok(completion.into())
    }

    fn name(&self) -> &str {
        "KimiClient"
    }
}

#[async_trait]
impl ExtractionService for KimiClient {
    async fn upload(&self, path: &Path) -> Result<UploadedFile, PipelineError> {
        let file = self.upload_file(path).await?;
        info!(
            "Uploaded {} as {} ({} bytes, status: {})",
            file.filename,
            file.id,
            file.bytes,
            file.status.as_deref().unwrap_or("unknown")
        );
        Ok(UploadedFile {
            remote_id: file.id,
            filename: file.filename,
            bytes: file.bytes,
        })
    }

    async fn extracted_text(&self, file: &UploadedFile) -> Result<String, PipelineError> {
        let text = self.file_content(&file.remote_id).await?;
        debug!("Fetched {} chars extracted from {}", text.chars().count(), file.remote_id);
        Ok(text)
    }

    async fn delete(&self, file: &UploadedFile) -> Result<(), PipelineError> {
        self.delete_file(&file.remote_id).await
    }

    fn name(&self) -> &str {
        "KimiClient"
    }
}
