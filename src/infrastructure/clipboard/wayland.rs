//! Wayland clipboard adapter using wl-copy / wl-paste

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::application::ports::{ClipboardError, LocalClipboard};
use crate::domain::clipboard::{ClipboardFormat, Payload};

/// MIME types offered by text selections
const TEXT_TYPES: &[&str] = &[
    "text/plain;charset=utf-8",
    "text/plain",
    "UTF8_STRING",
    "STRING",
    "TEXT",
];

/// Wayland clipboard adapter using wl-clipboard
pub struct WaylandClipboard;

impl WaylandClipboard {
    /// Create a new Wayland clipboard adapter
    pub fn new() -> Self {
        Self
    }

    /// Run wl-paste, returning stdout or `None` when the selection is empty
    async fn paste(args: &[&str]) -> Result<Option<Vec<u8>>, ClipboardError> {
        let output = Command::new("wl-paste")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ClipboardError::WlClipboardNotFound
                } else {
                    ClipboardError::ReadFailed(e.to_string())
                }
            })?;

        if output.status.success() {
            return Ok(Some(output.stdout));
        }

        // wl-paste exits non-zero with "Nothing is copied" / "No selection"
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("Nothing is copied") || stderr.contains("No selection") {
            return Ok(None);
        }

        Err(ClipboardError::ReadFailed(format!(
            "wl-paste exited with status: {}",
            output.status
        )))
    }
}

impl Default for WaylandClipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the format to read from the types the selection offers
fn choose_format(types: &str) -> Option<(ClipboardFormat, &'static str)> {
    let offered: Vec<&str> = types.lines().map(str::trim).collect();

    if offered.contains(&ClipboardFormat::Image.mime_type()) {
        return Some((ClipboardFormat::Image, ClipboardFormat::Image.mime_type()));
    }

    TEXT_TYPES
        .iter()
        .find(|t| offered.contains(t))
        .map(|t| (ClipboardFormat::Text, *t))
}

#[async_trait]
impl LocalClipboard for WaylandClipboard {
    async fn read(&self) -> Result<Option<Payload>, ClipboardError> {
        let Some(types) = Self::paste(&["--list-types"]).await? else {
            return Ok(None);
        };
        let types = String::from_utf8_lossy(&types);

        let Some((format, mime)) = choose_format(&types) else {
            return Ok(None);
        };

        match Self::paste(&["--no-newline", "--type", mime]).await? {
            Some(bytes) => selection_payload(bytes, format),
            None => Ok(None),
        }
    }

    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError> {
        let mut child = Command::new("wl-copy")
            .arg("--type")
            .arg(payload.format().mime_type())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ClipboardError::WlClipboardNotFound
                } else {
                    ClipboardError::WriteFailed(e.to_string())
                }
            })?;

        // Write payload to stdin, closing it so wl-copy can fork
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(payload.content())
                .await
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        }

        // Wait for process to complete
        let status = child
            .wait()
            .await
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;

        if !status.success() {
            return Err(ClipboardError::WriteFailed(format!(
                "wl-copy exited with status: {}",
                status
            )));
        }

        Ok(())
    }
}

/// Wrap pasted bytes; an empty selection is no content, text must be UTF-8
fn selection_payload(
    bytes: Vec<u8>,
    format: ClipboardFormat,
) -> Result<Option<Payload>, ClipboardError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if format == ClipboardFormat::Text && std::str::from_utf8(&bytes).is_err() {
        return Err(ClipboardError::ReadFailed(
            "text selection is not valid UTF-8".to_string(),
        ));
    }
    Ok(Some(Payload::new(bytes, format)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_png_over_text() {
        let types = "text/plain\nimage/png\n";
        assert_eq!(
            choose_format(types),
            Some((ClipboardFormat::Image, "image/png"))
        );
    }

    #[test]
    fn picks_utf8_text_first() {
        let types = "STRING\ntext/plain;charset=utf-8\nTEXT\n";
        assert_eq!(
            choose_format(types),
            Some((ClipboardFormat::Text, "text/plain;charset=utf-8"))
        );
    }

    #[test]
    fn text_selection_must_be_utf8() {
        assert!(matches!(
            selection_payload(vec![0xff, 0xfe, 0x41], ClipboardFormat::Text),
            Err(ClipboardError::ReadFailed(_))
        ));
        assert_eq!(
            selection_payload(b"hi".to_vec(), ClipboardFormat::Text).unwrap(),
            Some(Payload::text("hi"))
        );
        // Image bytes are passed through untouched
        assert!(selection_payload(vec![0xff, 0xfe], ClipboardFormat::Image)
            .unwrap()
            .is_some());
        assert_eq!(selection_payload(Vec::new(), ClipboardFormat::Text).unwrap(), None);
    }

    #[test]
    fn unsupported_types_are_skipped() {
        assert_eq!(choose_format("application/x-kde-cutselection\n"), None);
        assert_eq!(choose_format(""), None);
    }
}
