//! CLI presenter for output formatting

use colored::*;

use crate::application::NodeStatus;
use crate::domain::device::Device;
use crate::domain::node::Role;

/// Presenter for CLI output formatting
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print node state
    pub fn node_status(&self, state: &str) {
        eprintln!("{} Node: {}", "●".cyan(), state);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line summary of a node, as sent over the control channel
pub fn format_status(status: &NodeStatus) -> String {
    let role = match status.role {
        Some(Role::Server) => "server",
        Some(Role::Client) => "client",
        None => "detached",
    };

    let mut line = format!("{} port={}", role, status.port);
    if let Some(url) = &status.server_url {
        line.push_str(&format!(" server={}", url));
    }
    if let Some(epoch) = status.epoch {
        line.push_str(&format!(" epoch={}", epoch));
    }
    if status.role == Some(Role::Server) {
        line.push_str(&format!(" devices={}", status.active_devices));
    }
    line
}

/// `name@address` pairs separated by commas, or `none`
pub fn format_devices(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "none".to_string();
    }
    devices
        .iter()
        .map(|d| format!("{}@{}", d.name, d.address))
        .collect::<Vec<_>>()
        .join(", ")
}
