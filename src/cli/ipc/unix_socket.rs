//! Control endpoint over a unix socket (Linux, macOS)

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{UnixListener, UnixStream};
use tracing::warn;

use super::{exchange, serve_connection, ControlHandler, IpcClient, IpcServer};

const SOCKET_NAME: &str = "common-clipboard.sock";

/// `$XDG_RUNTIME_DIR/common-clipboard.sock`, or the temp dir without one
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_NAME));
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that owns the socket file while bound
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        if self.listener.is_some() {
            self.cleanup();
        }
    }
}

#[async_trait]
impl IpcServer for UnixSocketServer {
    fn bind(&mut self) -> io::Result<()> {
        // A live node still answers on the socket
        if self.socket_path.exists()
            && std::os::unix::net::UnixStream::connect(self.socket_path.path()).is_ok()
        {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                "another node is already running",
            ));
        }

        // Remove stale socket file if it exists
        self.socket_path.cleanup()?;

        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    fn path(&self) -> String {
        self.socket_path.path().to_string_lossy().to_string()
    }

    async fn run(&self, handler: Arc<dyn ControlHandler>) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, handler).await {
                            warn!(error = %e, "Control connection failed");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Control socket accept failed");
                }
            }
        }
    }

    fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

/// Unix Domain Socket client for sending commands to the node
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    /// Create a new socket client
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }
}

#[async_trait]
impl IpcClient for UnixSocketClient {
    fn is_node_running(&self) -> bool {
        self.socket_path.exists()
    }

    async fn send_command(&self, cmd: &str) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        exchange(stream, cmd).await
    }
}
