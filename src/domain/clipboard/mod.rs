//! Clipboard domain module

mod payload;

pub use payload::{ClipboardFormat, Payload};
