//! Ctl command handler - sends commands to the running node via IPC

use super::args::CtlAction;
use super::ipc::{create_ipc_client, ControlCommand};
use super::presenter::Presenter;

impl From<CtlAction> for ControlCommand {
    fn from(action: CtlAction) -> Self {
        match action {
            CtlAction::Status => ControlCommand::Status,
            CtlAction::Devices => ControlCommand::Devices,
            CtlAction::Reelect => ControlCommand::Reelect,
            CtlAction::Port { port } => ControlCommand::Port(port),
            CtlAction::Stop => ControlCommand::Stop,
        }
    }
}

/// Handle ctl subcommand
pub async fn handle_ctl_command(action: CtlAction, presenter: &Presenter) -> Result<(), String> {
    let client = create_ipc_client();

    if !client.is_node_running() {
        return Err("No node running. Start with: common-clipboard".to_string());
    }

    let command = ControlCommand::from(action);
    let response = client
        .send_command(&command.to_string())
        .await
        .map_err(|e| format!("Failed to communicate with node: {}", e))?;

    let response = response.trim();
    if let Some(stripped) = response.strip_prefix("error:") {
        return Err(stripped.trim().to_string());
    }

    match command {
        ControlCommand::Status | ControlCommand::Devices => presenter.output(response),
        _ => presenter.success(&format!("Command sent: {}", command)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_map_to_wire_commands() {
        assert_eq!(ControlCommand::from(CtlAction::Status).to_string(), "status");
        assert_eq!(ControlCommand::from(CtlAction::Devices).to_string(), "devices");
        assert_eq!(ControlCommand::from(CtlAction::Reelect).to_string(), "reelect");
        assert_eq!(
            ControlCommand::from(CtlAction::Port { port: 5050 }).to_string(),
            "port 5050"
        );
        assert_eq!(ControlCommand::from(CtlAction::Stop).to_string(), "stop");
    }
}
