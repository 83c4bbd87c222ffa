use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vox")]
#[command(about = "Voice input feedback: tray icon and sounds that follow recording state", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Advance the running service: start recording, or stop and begin processing
    Toggle(ControlCliArgs),
    /// Tell the running service that processing has finished
    Complete(ControlCliArgs),
    /// Show the running service's current state
    Status(StatusCliArgs),
    /// Validate icon and sound assets without starting the service
    CheckAssets(CheckAssetsCliArgs),
    /// Write placeholder beeps for every transition sound
    GenerateSounds(GenerateSoundsCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ControlCliArgs {
    /// Override the service port (default: from config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct StatusCliArgs {
    /// Override the service port (default: from config)
    #[arg(long)]
    pub port: Option<u16>,
    /// Print the Waybar JSON payload instead of a summary
    #[arg(long)]
    pub waybar: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CheckAssetsCliArgs {
    /// Asset directory to check (default: from config or discovery)
    #[arg(long)]
    pub dir: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateSoundsCliArgs {
    /// Directory to write the sounds to (default: `<assets>/sounds`)
    #[arg(long)]
    pub dir: Option<String>,
}
