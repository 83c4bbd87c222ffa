use anyhow::Result;
use clap::Parser;
use vox::{
    app,
    cli::{
        handle_check_assets_command, handle_complete_command, handle_generate_sounds_command,
        handle_status_command, handle_toggle_command, Cli, CliCommand,
    },
    config::Config,
    logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    logging::init(cli.verbose, &config)?;

    match cli.command {
        Some(CliCommand::Version) => {
            println!("Vox {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Toggle(args)) => {
            handle_toggle_command(args, &config).await?;
            return Ok(());
        }
        Some(CliCommand::Complete(args)) => {
            handle_complete_command(args, &config).await?;
            return Ok(());
        }
        Some(CliCommand::Status(args)) => {
            handle_status_command(args, &config).await?;
            return Ok(());
        }
        Some(CliCommand::CheckAssets(args)) => {
            handle_check_assets_command(args, &config)?;
            return Ok(());
        }
        Some(CliCommand::GenerateSounds(args)) => {
            handle_generate_sounds_command(args, &config)?;
            return Ok(());
        }
        None => {}
    }

    app::run_service(config).await
}
