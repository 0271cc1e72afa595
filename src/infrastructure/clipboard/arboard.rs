//! Cross-platform clipboard adapter using arboard
//!
//! Works on Windows, macOS, and Linux (X11/Wayland). Images cross the wire
//! as PNG and are converted to and from arboard's raw RGBA buffers here.

use std::borrow::Cow;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use tokio::sync::oneshot;

use crate::application::ports::{ClipboardError, LocalClipboard};
use crate::domain::clipboard::{ClipboardFormat, Payload};

type Job = Box<dyn FnOnce(&mut Option<arboard::Clipboard>) + Send>;

/// Cross-platform clipboard adapter using arboard.
///
/// The arboard handle lives on one dedicated thread for the life of the
/// adapter: on X11 written content is only served while a handle exists.
/// The handle is opened on first use.
pub struct ArboardClipboard {
    jobs: mpsc::Sender<Job>,
}

impl ArboardClipboard {
    /// Create a new arboard clipboard adapter
    pub fn new() -> Self {
        let (jobs, queue) = mpsc::channel::<Job>();

        // Exits once the adapter (and with it the sender) is dropped
        let _ = thread::Builder::new()
            .name("arboard-clipboard".to_string())
            .spawn(move || {
                let mut handle = None;
                while let Ok(job) = queue.recv() {
                    job(&mut handle);
                }
            });

        Self { jobs }
    }

    /// Run a blocking clipboard operation on the clipboard thread
    async fn with_clipboard<T, F>(&self, op: F) -> Result<T, ClipboardError>
    where
        T: Send + 'static,
        F: FnOnce(&mut arboard::Clipboard) -> Result<T, ClipboardError> + Send + 'static,
    {
        let (reply, result) = oneshot::channel();

        let job: Job = Box::new(move |handle| {
            if handle.is_none() {
                match arboard::Clipboard::new() {
                    Ok(clipboard) => *handle = Some(clipboard),
                    Err(e) => {
                        let _ = reply.send(Err(ClipboardError::ClipboardUnavailable(e.to_string())));
                        return;
                    }
                }
            }
            let outcome = match handle.as_mut() {
                Some(clipboard) => op(clipboard),
                None => Err(ClipboardError::ClipboardUnavailable(
                    "clipboard handle missing".to_string(),
                )),
            };
            let _ = reply.send(outcome);
        });

        self.jobs.send(job).map_err(|_| {
            ClipboardError::ClipboardUnavailable("clipboard thread stopped".to_string())
        })?;

        result.await.map_err(|_| {
            ClipboardError::ClipboardUnavailable("clipboard thread stopped".to_string())
        })?
    }
}

impl Default for ArboardClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalClipboard for ArboardClipboard {
    async fn read(&self) -> Result<Option<Payload>, ClipboardError> {
        self.with_clipboard(|clipboard| {
            match clipboard.get_text() {
                Ok(text) if !text.is_empty() => return Ok(Some(Payload::text(text))),
                Ok(_) | Err(arboard::Error::ContentNotAvailable) => {}
                Err(e) => return Err(ClipboardError::ReadFailed(e.to_string())),
            }

            match clipboard.get_image() {
                Ok(image) => rgba_to_png(image.width, image.height, image.bytes.into_owned())
                    .map(|png| Some(Payload::image(png))),
                Err(arboard::Error::ContentNotAvailable) => Ok(None),
                Err(e) => Err(ClipboardError::ReadFailed(e.to_string())),
            }
        })
        .await
    }

    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError> {
        let payload = payload.clone();

        self.with_clipboard(move |clipboard| match payload.format() {
            ClipboardFormat::Text => {
                let text = payload.as_text().ok_or_else(|| {
                    ClipboardError::WriteFailed("text payload is not valid UTF-8".to_string())
                })?;
                clipboard
                    .set_text(text)
                    .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
            }
            ClipboardFormat::Image => {
                let (width, height, rgba) = png_to_rgba(payload.content())?;
                clipboard
                    .set_image(arboard::ImageData {
                        width,
                        height,
                        bytes: Cow::Owned(rgba),
                    })
                    .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
            }
        })
        .await
    }
}

/// Encode a raw RGBA buffer as PNG
fn rgba_to_png(width: usize, height: usize, rgba: Vec<u8>) -> Result<Vec<u8>, ClipboardError> {
    let image = RgbaImage::from_raw(width as u32, height as u32, rgba).ok_or_else(|| {
        ClipboardError::ReadFailed(format!("bad image buffer for {}x{}", width, height))
    })?;

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ClipboardError::ReadFailed(e.to_string()))?;
    Ok(png.into_inner())
}

/// Decode PNG into width, height and a raw RGBA buffer
fn png_to_rgba(png: &[u8]) -> Result<(usize, usize, Vec<u8>), ClipboardError> {
    let image = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| ClipboardError::WriteFailed(format!("invalid PNG: {}", e)))?
        .into_rgba8();

    let (width, height) = image.dimensions();
    Ok((width as usize, height as usize, image.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_creates_without_opening_display() {
        let _clipboard = ArboardClipboard::new();
        let _clipboard = ArboardClipboard::default();
    }

    #[test]
    fn png_round_trips_pixels() {
        let rgba = vec![
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            255, 255, 255, 0,
        ];

        let png = rgba_to_png(2, 2, rgba.clone()).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let (width, height, decoded) = png_to_rgba(&png).unwrap();
        assert_eq!((width, height), (2, 2));
        assert_eq!(decoded, rgba);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(rgba_to_png(4, 4, vec![0; 3]).is_err());
    }

    #[test]
    fn invalid_png_is_rejected() {
        assert!(png_to_rgba(b"not a png").is_err());
    }
}
