//! In-memory clipboard adapter

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::ports::{ClipboardError, LocalClipboard};
use crate::domain::clipboard::Payload;

/// Clipboard that lives only inside this process.
///
/// Clones share the same content.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Arc<Mutex<Option<Payload>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content, as if the user copied something
    pub fn set(&self, payload: Payload) {
        *self.content.lock() = Some(payload);
    }

    pub fn get(&self) -> Option<Payload> {
        self.content.lock().clone()
    }
}

#[async_trait]
impl LocalClipboard for MemoryClipboard {
    async fn read(&self) -> Result<Option<Payload>, ClipboardError> {
        Ok(self.get())
    }

    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError> {
        self.set(payload.clone());
        Ok(())
    }
}
