//! Common Clipboard CLI entry point

use std::process::ExitCode;

use clap::Parser;

use common_clipboard::cli::{
    app::{cli_config, load_merged_config, resolve_options, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    ctl_cmd::handle_ctl_command,
    logging::init_logging,
    node_app::run_node,
    presenter::Presenter,
};
use common_clipboard::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();
    init_logging(cli.verbose);
    let cli_layer = cli_config(&cli);

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Ctl { action }) => {
            if let Err(e) = handle_ctl_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Merge: defaults < file < env < cli
    let config = load_merged_config(cli_layer).await;

    let options = match resolve_options(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_node(options).await
}
