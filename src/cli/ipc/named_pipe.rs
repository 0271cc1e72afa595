//! Control endpoint over a Windows named pipe

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::windows::named_pipe::{ClientOptions, ServerOptions};
use tracing::warn;

use super::{exchange, serve_connection, ControlHandler, IpcClient, IpcServer};

const PIPE_NAME: &str = r"\\.\pipe\common-clipboard";

/// Pipe name, overridable for tests
#[derive(Debug, Clone)]
pub struct PipePath(String);

impl PipePath {
    pub fn new() -> Self {
        Self(PIPE_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PipePath {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts one pipe instance per control connection
pub struct NamedPipeServer {
    pipe: PipePath,
    bound: bool,
}

impl NamedPipeServer {
    pub fn new(pipe: PipePath) -> Self {
        Self { pipe, bound: false }
    }
}

#[async_trait]
impl IpcServer for NamedPipeServer {
    /// The first instance is created in `run`; a second node fails there.
    fn bind(&mut self) -> io::Result<()> {
        self.bound = true;
        Ok(())
    }

    fn path(&self) -> String {
        self.pipe.as_str().to_string()
    }

    async fn run(&self, handler: Arc<dyn ControlHandler>) -> io::Result<()> {
        if !self.bound {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "control pipe not bound"));
        }

        let mut instance = ServerOptions::new()
            .first_pipe_instance(true)
            .create(self.pipe.as_str())?;

        loop {
            instance.connect().await?;
            let connected = instance;
            instance = ServerOptions::new().create(self.pipe.as_str())?;

            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(connected, handler).await {
                    warn!(error = %e, "Control connection failed");
                }
            });
        }
    }

    fn cleanup(&self) {}
}

pub struct NamedPipeClient {
    pipe: PipePath,
}

impl NamedPipeClient {
    pub fn new(pipe: PipePath) -> Self {
        Self { pipe }
    }
}

#[async_trait]
impl IpcClient for NamedPipeClient {
    fn is_node_running(&self) -> bool {
        std::fs::metadata(self.pipe.as_str()).is_ok()
    }

    async fn send_command(&self, cmd: &str) -> io::Result<String> {
        let client = ClientOptions::new().open(self.pipe.as_str())?;
        exchange(client, cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipe_name() {
        assert_eq!(PipePath::new().as_str(), PIPE_NAME);
    }
}
