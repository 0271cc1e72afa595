//! Signal handling for the foreground node

use colored::Colorize;
use tokio::sync::mpsc;

/// Requests delivered to the node's control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSignal {
    /// Re-run the election (SIGHUP, `ctl reelect`)
    Reelect,
    /// Rebind the relay on another port (`ctl port`)
    ChangePort(u16),
    /// Stop the node (SIGINT/SIGTERM, `ctl stop`)
    Shutdown,
}

/// Node signal handler
///
/// Turns OS signals into [`NodeSignal`]s and hands out a sender so other
/// sources (the IPC server) can feed the same loop.
pub struct NodeSignalHandler {
    receiver: mpsc::Receiver<NodeSignal>,
}

impl NodeSignalHandler {
    /// Create the handler and start listening for OS signals
    pub async fn new() -> Result<(Self, mpsc::Sender<NodeSignal>), std::io::Error> {
        let (tx, rx) = mpsc::channel(10);
        listen(tx.clone())?;
        Ok((Self { receiver: rx }, tx))
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<NodeSignal> {
        self.receiver.recv().await
    }
}

#[cfg(unix)]
fn listen(tx: mpsc::Sender<NodeSignal>) -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let handlers = [
        (SignalKind::interrupt(), "SIGINT", NodeSignal::Shutdown),
        (SignalKind::terminate(), "SIGTERM", NodeSignal::Shutdown),
        (SignalKind::hangup(), "SIGHUP", NodeSignal::Reelect),
    ];

    for (kind, name, action) in handlers {
        let mut stream = signal(kind)?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                eprintln!("{} Received {}", "↓".cyan(), name);
                if tx.send(action).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(())
}

#[cfg(not(unix))]
fn listen(tx: mpsc::Sender<NodeSignal>) -> Result<(), std::io::Error> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} Received Ctrl+C", "↓".cyan());
            if tx.send(NodeSignal::Shutdown).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}
