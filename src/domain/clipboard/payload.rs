//! Clipboard payload value object

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::domain::error::FormatParseError;

/// Clipboard content formats that can cross the wire.
///
/// The wire form is the `Data-Type` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardFormat {
    Text,
    Image,
}

impl ClipboardFormat {
    /// Get the `Data-Type` header value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// MIME type used by platform clipboard tools
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Image => "image/png",
        }
    }
}

impl fmt::Display for ClipboardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClipboardFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(FormatParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// One clipboard snapshot: raw content plus its format.
///
/// Text content is UTF-8, image content is PNG. Two payloads are equal only
/// when both the bytes and the format match, which is what "the clipboard
/// changed" means throughout the sync loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    content: Bytes,
    format: ClipboardFormat,
}

impl Payload {
    pub fn new(content: impl Into<Bytes>, format: ClipboardFormat) -> Self {
        Self {
            content: content.into(),
            format,
        }
    }

    /// Create a text payload
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text.into(), ClipboardFormat::Text)
    }

    /// Create an image payload from PNG bytes
    pub fn image(png: impl Into<Bytes>) -> Self {
        Self::new(png, ClipboardFormat::Image)
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn format(&self) -> ClipboardFormat {
        self.format
    }

    /// Text view of the content, if this is a valid UTF-8 text payload
    pub fn as_text(&self) -> Option<&str> {
        match self.format {
            ClipboardFormat::Text => std::str::from_utf8(&self.content).ok(),
            ClipboardFormat::Image => None,
        }
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
