use clap::Parser;
use tracing::info;
use upnext::cli::{Cli, Command};
use upnext::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();

    // Load configuration
    let config = startup::load_config()?;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            info!("Starting upnext");
            startup::run_watch(config).await
        }
        Command::Calendars => startup::run_calendars(config).await,
        Command::Toggle { source_id } => startup::run_toggle(config, &source_id).await,
        Command::Connect => startup::run_connect(config).await,
        Command::ShowNow => startup::run_show_now(config).await,
        Command::Join => startup::run_join(config).await,
        Command::Dismiss => startup::run_dismiss(config).await,
    }
}
