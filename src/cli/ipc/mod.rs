//! IPC (Inter-Process Communication) module for node control
//!
//! Provides platform-specific implementations:
//! - Unix (Linux/macOS): Unix Domain Sockets
//! - Windows: Named Pipes
//!
//! The protocol is one command line in, one response line out.

#[cfg(windows)]
mod named_pipe;
#[cfg(unix)]
mod unix_socket;

#[cfg(windows)]
pub use named_pipe::{NamedPipeClient, NamedPipeServer, PipePath};
#[cfg(unix)]
pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Commands accepted over the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Status,
    Devices,
    Reelect,
    Port(u16),
    Stop,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Status => write!(f, "status"),
            ControlCommand::Devices => write!(f, "devices"),
            ControlCommand::Reelect => write!(f, "reelect"),
            ControlCommand::Port(port) => write!(f, "port {}", port),
            ControlCommand::Stop => write!(f, "stop"),
        }
    }
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("status"), None) => ControlCommand::Status,
            (Some("devices"), None) => ControlCommand::Devices,
            (Some("reelect"), None) => ControlCommand::Reelect,
            (Some("stop"), None) => ControlCommand::Stop,
            (Some("port"), Some(port)) => ControlCommand::Port(
                port.parse()
                    .map_err(|_| format!("invalid port: {}", port))?,
            ),
            _ => return Err("unknown command".to_string()),
        };

        if words.next().is_some() {
            return Err("unexpected arguments".to_string());
        }
        Ok(command)
    }
}

/// Answers control commands on behalf of the running node
#[async_trait::async_trait]
pub trait ControlHandler: Send + Sync {
    /// Handle one command, returning a single response line
    async fn handle(&self, command: ControlCommand) -> String;
}

/// Trait for IPC servers that listen for control commands
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept connections forever, answering each with `handler`
    async fn run(&self, handler: Arc<dyn ControlHandler>) -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Trait for IPC clients that send commands to the node
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    /// Check if a node appears to be running (endpoint exists)
    fn is_node_running(&self) -> bool;

    /// Send a command and receive response
    async fn send_command(&self, cmd: &str) -> io::Result<String>;
}

/// Serve a single connection: read one line, write one line
pub(crate) async fn serve_connection<T>(stream: T, handler: Arc<dyn ControlHandler>) -> io::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let response = match line.trim().parse::<ControlCommand>() {
        Ok(command) => handler.handle(command).await,
        Err(e) => format!("error: {}", e),
    };

    // Keep the reply on one line
    let response = response.replace('\n', " ");
    writer.write_all(format!("{}\n", response).as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await?;

    Ok(())
}

/// Send one line and read one line back
pub(crate) async fn exchange<T>(stream: T, cmd: &str) -> io::Result<String>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    writer.write_all(format!("{}\n", cmd).as_bytes()).await?;
    writer.flush().await?;

    let mut reader = BufReader::new(reader);
    let mut response = String::new();
    reader.read_line(&mut response).await?;
    Ok(response)
}

/// Create the appropriate IPC server for the current platform
#[cfg(unix)]
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(UnixSocketServer::new(SocketPath::new()))
}

#[cfg(windows)]
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(NamedPipeServer::new(PipePath::new()))
}

/// Create the appropriate IPC client for the current platform
#[cfg(unix)]
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(UnixSocketClient::new(SocketPath::new()))
}

#[cfg(windows)]
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(NamedPipeClient::new(PipePath::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl ControlHandler for Echo {
        async fn handle(&self, command: ControlCommand) -> String {
            format!("got {}\nsecond line", command)
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!("status".parse::<ControlCommand>(), Ok(ControlCommand::Status));
        assert_eq!(" devices \n".parse::<ControlCommand>(), Ok(ControlCommand::Devices));
        assert_eq!("reelect".parse::<ControlCommand>(), Ok(ControlCommand::Reelect));
        assert_eq!("port 5050".parse::<ControlCommand>(), Ok(ControlCommand::Port(5050)));
        assert_eq!("stop".parse::<ControlCommand>(), Ok(ControlCommand::Stop));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!("toggle".parse::<ControlCommand>().is_err());
        assert!("port".parse::<ControlCommand>().is_err());
        assert!("port 99999".parse::<ControlCommand>().is_err());
        assert!("status now".parse::<ControlCommand>().is_err());
        assert!("".parse::<ControlCommand>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let command = ControlCommand::Port(6000);
        assert_eq!(command.to_string().parse::<ControlCommand>(), Ok(command));
    }

    #[tokio::test]
    async fn connection_answers_with_one_line() {
        let (client, server) = tokio::io::duplex(1024);
        let serve = tokio::spawn(serve_connection(server, Arc::new(Echo)));

        let response = exchange(client, "port 7000").await.unwrap();
        assert_eq!(response, "got port 7000 second line\n");
        serve.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn unknown_command_is_an_error_line() {
        let (client, server) = tokio::io::duplex(1024);
        let serve = tokio::spawn(serve_connection(server, Arc::new(Echo)));

        let response = exchange(client, "toggle").await.unwrap();
        assert_eq!(response, "error: unknown command\n");
        serve.await.unwrap().unwrap();
    }
}
