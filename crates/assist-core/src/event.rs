//! Raw events delivered by the event source.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::action::ActionKind;
use crate::content::ContentPayload;

/// Stable identity of "the same content" for double-action comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an identity supplied by the event source (object id, hash, ...).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Compute a SHA-256 fingerprint for a payload.
    ///
    /// File paths are compared as a set, so the same files selected in a
    /// different order produce the same fingerprint.
    pub fn of_payload(payload: &ContentPayload) -> Self {
        let mut hasher = Sha256::new();
        match payload {
            ContentPayload::Text { text } => {
                hasher.update(b"text\0");
                hasher.update(text.as_bytes());
            }
            ContentPayload::FilePaths { paths } => {
                let mut sorted: Vec<String> = paths
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect();
                sorted.sort();
                sorted.dedup();
                hasher.update(b"files\0");
                for path in sorted {
                    hasher.update(path.as_bytes());
                    hasher.update(b"\0");
                }
            }
            ContentPayload::Image { data, format } => {
                hasher.update(b"image\0");
                hasher.update(format.extension().as_bytes());
                hasher.update(b"\0");
                hasher.update(data);
            }
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// The fingerprint as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single observed action. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Which interaction this was.
    pub kind: ActionKind,
    /// Identity of the content acted on.
    pub fingerprint: Fingerprint,
    /// Milliseconds on the source's monotonic clock.
    pub timestamp_ms: u64,
    /// The content the fingerprint identifies.
    pub content: ContentPayload,
}

impl RawEvent {
    /// Create an event whose fingerprint is derived from the content.
    pub fn new(kind: ActionKind, content: ContentPayload, timestamp_ms: u64) -> Self {
        let fingerprint = Fingerprint::of_payload(&content);
        Self {
            kind,
            fingerprint,
            timestamp_ms,
            content,
        }
    }

    /// Create an event with a fingerprint supplied by the source.
    pub fn with_fingerprint(
        kind: ActionKind,
        fingerprint: Fingerprint,
        content: ContentPayload,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            kind,
            fingerprint,
            timestamp_ms,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ImageFormat;

    #[test]
    fn test_fingerprint_stable() {
        let first = Fingerprint::of_payload(&ContentPayload::text("test prompt"));
        let second = Fingerprint::of_payload(&ContentPayload::text("test prompt"));
        let different = Fingerprint::of_payload(&ContentPayload::text("another prompt"));

        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_lowercase_sha256_hex() {
        let fingerprint = Fingerprint::of_payload(&ContentPayload::text("Hello"));
        assert_eq!(
            fingerprint.as_str(),
            "e2672696f355ee00cf5624cb8b2a1796b3b231a436d25451b2278be748326d41"
        );
    }

    #[test]
    fn test_fingerprint_file_order_insensitive() {
        let a = Fingerprint::of_payload(&ContentPayload::files(["/tmp/a", "/tmp/b"]));
        let b = Fingerprint::of_payload(&ContentPayload::files(["/tmp/b", "/tmp/a"]));
        let c = Fingerprint::of_payload(&ContentPayload::files(["/tmp/a"]));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_distinguishes_variants() {
        let text = Fingerprint::of_payload(&ContentPayload::text("/tmp/a"));
        let files = Fingerprint::of_payload(&ContentPayload::files(["/tmp/a"]));
        let png = Fingerprint::of_payload(&ContentPayload::image(vec![1, 2, 3], ImageFormat::Png));
        let tiff =
            Fingerprint::of_payload(&ContentPayload::image(vec![1, 2, 3], ImageFormat::Tiff));

        assert_ne!(text, files);
        assert_ne!(png, tiff);
    }

    #[test]
    fn test_short_fingerprint() {
        let fp = Fingerprint::new("abc");
        assert_eq!(fp.short(), "abc");

        let long = Fingerprint::of_payload(&ContentPayload::text("x"));
        assert_eq!(long.short().len(), 12);
    }

    #[test]
    fn test_raw_event_derives_fingerprint() {
        let event = RawEvent::new(ActionKind::Copy, ContentPayload::text("Hello"), 42);
        assert_eq!(
            event.fingerprint,
            Fingerprint::of_payload(&ContentPayload::text("Hello"))
        );
        assert_eq!(event.timestamp_ms, 42);
    }
}
