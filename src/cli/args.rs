//! CLI argument definitions using Clap

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::timing::Duration;
use crate::infrastructure::ClipboardBackend;

/// Common Clipboard - one clipboard for every host on the LAN
#[derive(Parser, Debug)]
#[command(name = "common-clipboard")]
#[command(version)]
#[command(about = "Share one clipboard between every host on the local network")]
#[command(long_about = None)]
pub struct Cli {
    /// Port every relay server on the subnet listens on
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Name announced to the relay server (defaults to the hostname)
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<String>,

    /// Clipboard backend (arboard, wayland, memory)
    #[arg(short = 'b', long, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Control the running node
    Ctl {
        #[command(subcommand)]
        action: CtlAction,
    },
}

/// Node control actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtlAction {
    /// Show role, active server and registered devices count
    Status,
    /// List devices registered with this node's relay server
    Devices,
    /// Re-run the server election
    Reelect,
    /// Move the relay to another port
    Port {
        /// New port
        port: u16,
    },
    /// Stop the node
    Stop,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Fully resolved options for running a node
#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub port: u16,
    pub device_name: String,
    pub backend: ClipboardBackend,
    pub tick_interval: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub scan_concurrency: usize,
    pub device_timeout: Duration,
    pub rescan_interval: Option<Duration>,
    pub failover_after: u32,
    pub max_payload: usize,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "port",
    "device_name",
    "clipboard_backend",
    "tick_interval",
    "request_timeout",
    "probe_timeout",
    "scan_concurrency",
    "device_timeout",
    "rescan_interval",
    "failover_after",
    "max_payload",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["common-clipboard"]);
        assert!(cli.port.is_none());
        assert!(cli.name.is_none());
        assert!(cli.backend.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_node_flags() {
        let cli = Cli::parse_from([
            "common-clipboard",
            "--port",
            "6000",
            "--name",
            "desk",
            "--backend",
            "memory",
            "-vv",
        ]);
        assert_eq!(cli.port, Some(6000));
        assert_eq!(cli.name, Some("desk".to_string()));
        assert_eq!(cli.backend, Some("memory".to_string()));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["common-clipboard", "--port", "70000"]).is_err());
    }

    #[test]
    fn cli_parses_ctl_port() {
        let cli = Cli::parse_from(["common-clipboard", "ctl", "port", "5050"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Ctl {
                action: CtlAction::Port { port: 5050 }
            })
        ));
    }

    #[test]
    fn cli_parses_ctl_status() {
        let cli = Cli::parse_from(["common-clipboard", "ctl", "status"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Ctl {
                action: CtlAction::Status
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["common-clipboard", "config", "set", "port", "5050"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "port");
            assert_eq!(value, "5050");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("port"));
        assert!(is_valid_config_key("rescan_interval"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
