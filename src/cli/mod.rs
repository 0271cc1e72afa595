//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! the local control channel and the node runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod ctl_cmd;
pub mod ipc;
pub mod logging;
pub mod node_app;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{load_merged_config, resolve_options, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, CtlAction, NodeOptions};
pub use ctl_cmd::handle_ctl_command;
pub use node_app::run_node;
pub use presenter::Presenter;
