use anyhow::Result;
use clap::{Parser, Subcommand};
use retsite::commands::{check_command, host_arch_command, offsets_command};

/// Return-site resolver CLI.
///
/// This CLI is a thin wrapper around `retsite-core` (exposed in code as `retsite_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "retsite",
    version = retsite_core::version(),
    about = "Find every return instruction of a function for uprobe placement",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the return-instruction offsets of one or more functions.
    Offsets {
        /// Path to the ELF executable or shared object.
        #[arg(long)]
        path: String,

        /// Symbol name to resolve (exact match). Repeat for several symbols.
        #[arg(long = "symbol", required = true)]
        symbols: Vec<String>,

        /// Expected architecture (amd64, arm64). Defaults to the host's.
        #[arg(long)]
        arch: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate a probe config (JSON or YAML) and resolve all of its symbols.
    Check {
        /// Path to the probe config file.
        #[arg(long)]
        config: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the host architecture.
    Arch,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Offsets { path, symbols, arch, json } => {
            offsets_command(&path, &symbols, arch.as_deref(), json)?
        }
        Command::Check { config, json } => check_command(&config, json)?,
        Command::Arch => host_arch_command()?,
    }

    Ok(())
}
