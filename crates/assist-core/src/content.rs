//! Content payloads handed to the pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Encoding of an in-memory image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Tiff,
    Jpeg,
    Bmp,
    Gif,
    Webp,
}

impl ImageFormat {
    /// File extension (without the dot) used when the image is written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    /// MIME type sent with uploads.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Guess the format from a file extension (case-insensitive, dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

/// The content a user acted on.
///
/// Owned by the caller of `execute` until the pipeline consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPayload {
    /// Plain text (clipboard string or selection).
    Text { text: String },
    /// One or more filesystem paths, in selection order.
    FilePaths { paths: Vec<PathBuf> },
    /// Raw image bytes with their source encoding.
    Image { data: Vec<u8>, format: ImageFormat },
}

impl ContentPayload {
    /// Create a text payload.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPayload::Text { text: text.into() }
    }

    /// Create a file-path payload.
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ContentPayload::FilePaths {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an image payload.
    pub fn image(data: impl Into<Vec<u8>>, format: ImageFormat) -> Self {
        ContentPayload::Image {
            data: data.into(),
            format,
        }
    }

    /// Short description for logs; never includes the content itself.
    pub fn describe(&self) -> String {
        match self {
            ContentPayload::Text { text } => format!("text ({} chars)", text.chars().count()),
            ContentPayload::FilePaths { paths } => format!("{} file path(s)", paths.len()),
            ContentPayload::Image { data, format } => {
                format!("{} image ({} bytes)", format.extension(), data.len())
            }
        }
    }
}

/// Semantic type of a payload, as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    FilePaths,
    Image,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Text => "text",
            ContentType::FilePaths => "file_paths",
            ContentType::Image => "image",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension(".tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("txt"), None);
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_payload_serde_tagging() {
        let payload: ContentPayload =
            serde_json::from_str(r#"{"type":"file_paths","paths":["/a.pdf","/b.txt"]}"#).unwrap();
        assert_eq!(payload, ContentPayload::files(["/a.pdf", "/b.txt"]));

        let json = serde_json::to_string(&ContentPayload::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);
    }

    #[test]
    fn test_describe_does_not_leak_content() {
        let payload = ContentPayload::text("secret words");
        assert_eq!(payload.describe(), "text (12 chars)");
        assert!(!payload.describe().contains("secret"));
    }
}
