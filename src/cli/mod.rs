pub mod args;
pub mod assets;
pub mod client;
pub mod sounds;

pub use args::{
    CheckAssetsCliArgs, Cli, CliCommand, ControlCliArgs, GenerateSoundsCliArgs, StatusCliArgs,
};
pub use assets::handle_check_assets_command;
pub use client::ServiceClient;
pub use sounds::handle_generate_sounds_command;

use crate::config::Config;
use anyhow::Result;

fn client_for(port: Option<u16>, config: &Config) -> ServiceClient {
    ServiceClient::for_port(port.unwrap_or(config.api.port))
}

pub async fn handle_toggle_command(args: ControlCliArgs, config: &Config) -> Result<()> {
    let response = client_for(args.port, config).toggle().await?;
    if response.success {
        println!("{}", response.message);
    } else {
        println!("{} (toggle ignored)", response.message);
    }
    Ok(())
}

pub async fn handle_complete_command(args: ControlCliArgs, config: &Config) -> Result<()> {
    let state = client_for(args.port, config).complete().await?;
    println!("Processing complete, now {state}");
    Ok(())
}

pub async fn handle_status_command(args: StatusCliArgs, config: &Config) -> Result<()> {
    let client = client_for(args.port, config);

    if args.waybar {
        println!("{}", client.waybar_status().await?);
        return Ok(());
    }

    let status = client.status().await?;
    println!("State: {}", status.state);
    if status.recording {
        println!("Recording in progress");
    }
    Ok(())
}
