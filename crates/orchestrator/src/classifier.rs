//! Content classification.

use std::path::PathBuf;

use assist_core::{ContentPayload, ContentType, ImageFormat, PipelineError};

/// Determine the semantic type of a payload.
///
/// Payloads that carry nothing (empty text, an empty path list or zero
/// image bytes) are rejected as unsupported.
pub fn classify(payload: &ContentPayload) -> Result<ContentType, PipelineError> {
    match payload {
        ContentPayload::Text { text } if !text.is_empty() => Ok(ContentType::Text),
        ContentPayload::FilePaths { paths } if !paths.is_empty() => Ok(ContentType::FilePaths),
        ContentPayload::Image { data, .. } if !data.is_empty() => Ok(ContentType::Image),
        ContentPayload::Text { .. } => Err(PipelineError::UnsupportedType(
            "clipboard text is empty".to_string(),
        )),
        ContentPayload::FilePaths { .. } => Err(PipelineError::UnsupportedType(
            "file list is empty".to_string(),
        )),
        ContentPayload::Image { .. } => Err(PipelineError::UnsupportedType(
            "image has no data".to_string(),
        )),
    }
}

/// Check a caller-supplied content type against the payload.
pub fn resolve(
    payload: &ContentPayload,
    declared: Option<ContentType>,
) -> Result<ContentType, PipelineError> {
    let actual = classify(payload)?;
    match declared {
        Some(declared) if declared != actual => Err(PipelineError::UnsupportedType(format!(
            "declared {} but payload is {}",
            declared, actual
        ))),
        _ => Ok(actual),
    }
}

/// Every representation a clipboard offered at once.
///
/// Clipboards often carry several representations of one copy (a file copy
/// also exposes the file name as text). [`ClipboardSnapshot::into_payload`]
/// picks the one the pipeline should act on: image, then files, then text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub text: Option<String>,
    pub files: Vec<PathBuf>,
    pub image: Option<(Vec<u8>, ImageFormat)>,
}

impl ClipboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image(mut self, data: impl Into<Vec<u8>>, format: ImageFormat) -> Self {
        self.image = Some((data.into(), format));
        self
    }

    /// Collapse to a single payload.
    pub fn into_payload(self) -> Result<ContentPayload, PipelineError> {
        if let Some((data, format)) = self.image.filter(|(data, _)| !data.is_empty()) {
            return Ok(ContentPayload::Image { data, format });
        }
        if !self.files.is_empty() {
            return Ok(ContentPayload::FilePaths { paths: self.files });
        }
        match self.text {
            Some(text) if !text.is_empty() => Ok(ContentPayload::Text { text }),
            _ => Err(PipelineError::UnsupportedType(
                "clipboard holds no text, files or image".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::ErrorKind;

    #[test]
    fn test_classify_variants() {
        assert_eq!(
            classify(&ContentPayload::text("Hello")).unwrap(),
            ContentType::Text
        );
        assert_eq!(
            classify(&ContentPayload::files(["/tmp/a.pdf"])).unwrap(),
            ContentType::FilePaths
        );
        assert_eq!(
            classify(&ContentPayload::image(vec![1, 2, 3], ImageFormat::Png)).unwrap(),
            ContentType::Image
        );
    }

    #[test]
    fn test_classify_whitespace_text_is_text() {
        // Emptiness of the instruction is judged later by the prompt builder.
        assert_eq!(
            classify(&ContentPayload::text("   ")).unwrap(),
            ContentType::Text
        );
    }

    #[test]
    fn test_classify_empty_payloads() {
        for payload in [
            ContentPayload::text(""),
            ContentPayload::files(Vec::<PathBuf>::new()),
            ContentPayload::image(Vec::new(), ImageFormat::Tiff),
        ] {
            let err = classify(&payload).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        }
    }

    #[test]
    fn test_resolve_rejects_mismatch() {
        let payload = ContentPayload::text("Hello");
        assert_eq!(resolve(&payload, None).unwrap(), ContentType::Text);
        assert_eq!(
            resolve(&payload, Some(ContentType::Text)).unwrap(),
            ContentType::Text
        );

        let err = resolve(&payload, Some(ContentType::Image)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_snapshot_priority() {
        let snapshot = ClipboardSnapshot::new()
            .with_text("report.pdf")
            .with_files(["/tmp/report.pdf"])
            .with_image(vec![0x89, 0x50], ImageFormat::Png);
        assert!(matches!(
            snapshot.into_payload().unwrap(),
            ContentPayload::Image { .. }
        ));

        let snapshot = ClipboardSnapshot::new()
            .with_text("report.pdf")
            .with_files(["/tmp/report.pdf"]);
        assert_eq!(
            snapshot.into_payload().unwrap(),
            ContentPayload::files(["/tmp/report.pdf"])
        );

        let snapshot = ClipboardSnapshot::new().with_text("just text");
        assert_eq!(
            snapshot.into_payload().unwrap(),
            ContentPayload::text("just text")
        );
    }

    #[test]
    fn test_snapshot_empty_image_falls_through() {
        let snapshot = ClipboardSnapshot::new()
            .with_text("caption")
            .with_image(Vec::new(), ImageFormat::Png);
        assert_eq!(
            snapshot.into_payload().unwrap(),
            ContentPayload::text("caption")
        );
    }

    #[test]
    fn test_snapshot_nothing_usable() {
        let err = ClipboardSnapshot::new().into_payload().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
