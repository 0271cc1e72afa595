//! Foreground node runner

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::ports::LocalClipboard;
use crate::application::{Node, NodeConfig};
use crate::infrastructure::{
    create_clipboard, detect_local_ip, AxumRelayHost, HttpRelayClient, SubnetPeers,
};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::NodeOptions;
use super::ipc::{create_ipc_server, ControlCommand, ControlHandler};
use super::presenter::{format_devices, format_status, Presenter};
use super::signals::{NodeSignal, NodeSignalHandler};

/// The node as wired for a real LAN
pub type LanNode = Node<Box<dyn LocalClipboard>, HttpRelayClient, AxumRelayHost, SubnetPeers>;

/// Answers `ctl` commands. Queries are served directly, actions are
/// forwarded to the control loop.
pub struct NodeController {
    node: Arc<LanNode>,
    signals: mpsc::Sender<NodeSignal>,
}

impl NodeController {
    pub fn new(node: Arc<LanNode>, signals: mpsc::Sender<NodeSignal>) -> Self {
        Self { node, signals }
    }

    async fn forward(&self, signal: NodeSignal) -> String {
        match self.signals.send(signal).await {
            Ok(()) => "ok".to_string(),
            Err(_) => "error: node is shutting down".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ControlHandler for NodeController {
    async fn handle(&self, command: ControlCommand) -> String {
        match command {
            ControlCommand::Status => format_status(&self.node.status().await),
            ControlCommand::Devices => format_devices(&self.node.active_devices().await),
            ControlCommand::Reelect => self.forward(NodeSignal::Reelect).await,
            ControlCommand::Port(0) => "error: port must be non-zero".to_string(),
            ControlCommand::Port(port) => self.forward(NodeSignal::ChangePort(port)).await,
            ControlCommand::Stop => self.forward(NodeSignal::Shutdown).await,
        }
    }
}

/// Build the node from resolved options
pub fn build_node(options: &NodeOptions) -> Result<LanNode, String> {
    let local_ip = detect_local_ip();

    let relay = HttpRelayClient::with_timeouts(
        options.request_timeout.as_std(),
        options.probe_timeout.as_std(),
    )
    .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let host = AxumRelayHost::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
        local_ip,
        options.device_timeout.as_std(),
    )
    .with_max_payload(options.max_payload);

    let config = NodeConfig {
        port: options.port,
        device_name: options.device_name.clone(),
        tick_interval: options.tick_interval,
        scan_concurrency: options.scan_concurrency,
        rescan_interval: options.rescan_interval,
        failover_after: options.failover_after,
    };

    Ok(Node::new(
        create_clipboard(options.backend),
        relay,
        host,
        SubnetPeers::new(local_ip),
        config,
    ))
}

/// Run the node in the foreground until stopped
pub async fn run_node(options: NodeOptions) -> ExitCode {
    let presenter = Presenter::new();

    let node = match build_node(&options) {
        Ok(node) => Arc::new(node),
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Setup signal handler (returns handler + sender for the IPC server)
    let (mut signals, signal_tx) = match NodeSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut ipc_server = create_ipc_server();
    if let Err(e) = ipc_server.bind() {
        presenter.error(&format!("Failed to bind control endpoint: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let ipc_path = ipc_server.path();

    let controller = Arc::new(NodeController::new(Arc::clone(&node), signal_tx));
    let ipc_task = tokio::spawn(async move {
        if let Err(e) = ipc_server.run(controller).await {
            warn!(error = %e, "Control endpoint stopped");
        }
        ipc_server.cleanup();
    });

    presenter.node_status(&format!(
        "Starting as {} (backend: {}, port: {})",
        options.device_name, options.backend, options.port
    ));
    presenter.info(&format!(
        "PID: {} | Control: {} | SIGINT: exit | SIGHUP: re-elect",
        std::process::id(),
        ipc_path
    ));

    let keep_running = Arc::new(AtomicBool::new(true));
    let mut runner = tokio::spawn(Arc::clone(&node).run(Arc::clone(&keep_running)));

    let clean = loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(NodeSignal::Reelect) => {
                    info!("Re-election requested");
                    node.spawn_reelect();
                }
                Some(NodeSignal::ChangePort(port)) => {
                    let node = Arc::clone(&node);
                    tokio::spawn(async move { node.change_port(port).await });
                }
                Some(NodeSignal::Shutdown) => break true,
                None => break false,
            },
            result = &mut runner => {
                if let Err(e) = result {
                    presenter.error(&format!("Node stopped unexpectedly: {}", e));
                }
                break false;
            }
        }
    };

    presenter.node_status("Shutting down...");
    keep_running.store(false, Ordering::SeqCst);
    if !runner.is_finished() {
        let _ = runner.await;
    }
    node.shutdown().await;

    ipc_task.abort();
    let _ = ipc_task.await;

    if clean {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
