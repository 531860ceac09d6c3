//! Newline-delimited JSON events read from stdin.
//!
//! Each line describes one observed action, for example:
//!
//! ```text
//! {"kind":"copy","timestamp_ms":1000,"text":"Hello"}
//! {"kind":"select","paths":["/tmp/report.pdf"]}
//! {"kind":"copy","image":"/tmp/shot.png"}
//! ```
//!
//! A line may carry several representations at once (text plus paths, as a
//! file copy does); the clipboard priority picks one.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use assist_core::{ActionKind, Fingerprint, ImageFormat, RawEvent};
use orchestrator::ClipboardSnapshot;
use serde::Deserialize;
use thiserror::Error;

/// Errors for a single input line. The line is skipped, the stream continues.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid event line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event carries no content: {0}")]
    NoContent(String),

    #[error("cannot read image {path}: {source}")]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown image format: {0}")]
    UnknownFormat(String),
}

/// One event line as written by the capture process.
#[derive(Debug, Clone, Deserialize)]
pub struct EventLine {
    pub kind: String,
    /// Source clock in milliseconds. Absent means the process's own
    /// monotonic clock; a stream should not mix the two.
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Path of an image file standing in for clipboard image bytes.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Image encoding; guessed from the file extension when absent.
    #[serde(default)]
    pub format: Option<String>,
}

impl EventLine {
    pub fn parse(line: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Convert to a [`RawEvent`], loading image bytes if needed.
    pub async fn into_event(self) -> Result<RawEvent, InputError> {
        let kind = match ActionKind::from_str(&self.kind) {
            Ok(kind) => kind,
            Err(never) => match never {},
        };
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(now_ms);

        let mut snapshot = ClipboardSnapshot::new().with_files(self.paths);
        if let Some(text) = self.text {
            snapshot = snapshot.with_text(text);
        }
        if let Some(path) = &self.image {
            let format = image_format(path, self.format.as_deref())?;
            let data = tokio::fs::read(path).await.map_err(|source| InputError::Image {
                path: path.clone(),
                source,
            })?;
            snapshot = snapshot.with_image(data, format);
        }

        let content = snapshot
            .into_payload()
            .map_err(|e| InputError::NoContent(e.to_string()))?;

        Ok(match self.fingerprint {
            Some(fp) => RawEvent::with_fingerprint(kind, Fingerprint::new(fp), content, timestamp_ms),
            None => RawEvent::new(kind, content, timestamp_ms),
        })
    }
}

fn image_format(path: &Path, declared: Option<&str>) -> Result<ImageFormat, InputError> {
    let hint = declared
        .map(str::to_string)
        .or_else(|| path.extension().map(|e| e.to_string_lossy().into_owned()))
        .unwrap_or_default();
    ImageFormat::from_extension(&hint).ok_or(InputError::UnknownFormat(hint))
}

/// Milliseconds since the first event without a timestamp was read.
fn now_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::ContentPayload;

    #[tokio::test]
    async fn test_text_line() {
        let event = EventLine::parse(r#"{"kind":"copy","timestamp_ms":1000,"text":"Hello"}"#)
            .unwrap()
            .into_event()
            .await
            .unwrap();

        assert_eq!(event.kind, ActionKind::Copy);
        assert_eq!(event.timestamp_ms, 1000);
        assert_eq!(event.content, ContentPayload::text("Hello"));
        assert_eq!(
            event.fingerprint,
            Fingerprint::of_payload(&ContentPayload::text("Hello"))
        );
    }

    #[tokio::test]
    async fn test_files_win_over_text() {
        let event = EventLine::parse(
            r#"{"kind":"select","timestamp_ms":5,"text":"report.pdf","paths":["/tmp/report.pdf"]}"#,
        )
        .unwrap()
        .into_event()
        .await
        .unwrap();

        assert_eq!(event.kind, ActionKind::Select);
        assert_eq!(event.content, ContentPayload::files(["/tmp/report.pdf"]));
    }

    #[tokio::test]
    async fn test_image_line_and_custom_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let line = format!(
            r#"{{"kind":"Drag","timestamp_ms":7,"fingerprint":"obj-1","image":{}}}"#,
            serde_json::to_string(&path).unwrap()
        );
        let event = EventLine::parse(&line).unwrap().into_event().await.unwrap();

        assert_eq!(event.kind, ActionKind::Custom("drag".to_string()));
        assert_eq!(event.fingerprint, Fingerprint::new("obj-1"));
        assert_eq!(
            event.content,
            ContentPayload::image(vec![0x89, b'P', b'N', b'G'], ImageFormat::Png)
        );
    }

    #[tokio::test]
    async fn test_missing_timestamp_uses_monotonic_clock() {
        let line = r#"{"kind":"copy","text":"x"}"#;
        let first = EventLine::parse(line).unwrap().into_event().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = EventLine::parse(line).unwrap().into_event().await.unwrap();

        assert!(second.timestamp_ms >= first.timestamp_ms + 20);
        // Far below any wall-clock epoch value.
        assert!(second.timestamp_ms < 60_000);
    }

    #[tokio::test]
    async fn test_invalid_lines() {
        assert!(matches!(
            EventLine::parse("not json"),
            Err(InputError::Json(_))
        ));

        let err = EventLine::parse(r#"{"kind":"copy"}"#)
            .unwrap()
            .into_event()
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::NoContent(_)));

        let err = EventLine::parse(r#"{"kind":"copy","image":"/tmp/x.svg"}"#)
            .unwrap()
            .into_event()
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::UnknownFormat(_)));
    }
}
