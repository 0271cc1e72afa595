//! Clipboard infrastructure module
//!
//! Provides cross-platform clipboard support using arboard (primary),
//! wl-clipboard on Wayland, or an in-memory clipboard for headless runs.

mod arboard;
mod memory;
mod wayland;

use std::fmt;
use std::str::FromStr;

pub use arboard::ArboardClipboard;
pub use memory::MemoryClipboard;
pub use wayland::WaylandClipboard;

use crate::application::ports::LocalClipboard;

/// Available clipboard backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardBackend {
    /// Cross-platform arboard library (default)
    #[default]
    Arboard,
    /// wl-copy / wl-paste from wl-clipboard
    Wayland,
    /// Process-local clipboard, nothing reaches the OS
    Memory,
}

impl ClipboardBackend {
    pub const VALID_OPTIONS: &'static str = "arboard, wayland, memory";
}

impl fmt::Display for ClipboardBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardBackend::Arboard => write!(f, "arboard"),
            ClipboardBackend::Wayland => write!(f, "wayland"),
            ClipboardBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Error type for parsing a clipboard backend name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClipboardBackendError {
    pub value: String,
}

impl fmt::Display for ParseClipboardBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid clipboard backend '{}'. Valid options: {}",
            self.value,
            ClipboardBackend::VALID_OPTIONS
        )
    }
}

impl std::error::Error for ParseClipboardBackendError {}

impl FromStr for ClipboardBackend {
    type Err = ParseClipboardBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arboard" => Ok(ClipboardBackend::Arboard),
            "wayland" => Ok(ClipboardBackend::Wayland),
            "memory" => Ok(ClipboardBackend::Memory),
            _ => Err(ParseClipboardBackendError {
                value: s.to_string(),
            }),
        }
    }
}

/// Create the clipboard adapter for a backend
pub fn create_clipboard(backend: ClipboardBackend) -> Box<dyn LocalClipboard> {
    match backend {
        ClipboardBackend::Arboard => Box::new(ArboardClipboard::new()),
        ClipboardBackend::Wayland => Box::new(WaylandClipboard::new()),
        ClipboardBackend::Memory => Box::new(MemoryClipboard::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backends() {
        assert_eq!("arboard".parse::<ClipboardBackend>(), Ok(ClipboardBackend::Arboard));
        assert_eq!("Wayland".parse::<ClipboardBackend>(), Ok(ClipboardBackend::Wayland));
        assert_eq!(" memory ".parse::<ClipboardBackend>(), Ok(ClipboardBackend::Memory));
    }

    #[test]
    fn parse_unknown_backend_lists_options() {
        let err = "x11".parse::<ClipboardBackend>().unwrap_err();
        assert!(err.to_string().contains("arboard, wayland, memory"));
    }

    #[test]
    fn display_round_trips() {
        for backend in [
            ClipboardBackend::Arboard,
            ClipboardBackend::Wayland,
            ClipboardBackend::Memory,
        ] {
            assert_eq!(backend.to_string().parse::<ClipboardBackend>(), Ok(backend));
        }
    }
}
