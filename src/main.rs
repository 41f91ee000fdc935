use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pandora_playback::app::{run, RunOptions};

#[derive(Debug, Parser)]
#[command(
    name = "pandora-playback",
    version,
    about = "Replay a scripted Pandora playback session"
)]
struct Cli {
    #[arg(long, help = "Enable verbose debug logs")]
    debug: bool,

    #[arg(long, help = "Path to config.toml (defaults to ~/.config/pandora-playback)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Use the wall clock instead of the scripted clock")]
    realtime: bool,

    #[arg(long, help = "Check unscripted audio URLs with an HTTP HEAD request")]
    http_probe: bool,

    #[arg(help = "Session script to replay (reads stdin when omitted)")]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(RunOptions {
        debug: cli.debug,
        config_path: cli.config,
        realtime: cli.realtime,
        http_probe: cli.http_probe,
        script: cli.script,
    })
}
