//! Local clipboard port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::clipboard::Payload;

/// Clipboard errors
#[derive(Debug, Clone, Error)]
pub enum ClipboardError {
    #[error("wl-copy/wl-paste not found. Please install wl-clipboard.")]
    WlClipboardNotFound,

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Failed to read clipboard: {0}")]
    ReadFailed(String),

    #[error("Failed to write clipboard: {0}")]
    WriteFailed(String),
}

/// Port for the host's own clipboard
#[async_trait]
pub trait LocalClipboard: Send + Sync {
    /// Read the current clipboard content.
    ///
    /// # Returns
    /// `Ok(None)` when the clipboard is empty or holds a format that
    /// cannot be shared (neither text nor image).
    async fn read(&self) -> Result<Option<Payload>, ClipboardError>;

    /// Replace the clipboard content.
    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError>;
}

/// Blanket implementation for boxed clipboard types
#[async_trait]
impl LocalClipboard for Box<dyn LocalClipboard> {
    async fn read(&self) -> Result<Option<Payload>, ClipboardError> {
        self.as_ref().read().await
    }

    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError> {
        self.as_ref().write(payload).await
    }
}
