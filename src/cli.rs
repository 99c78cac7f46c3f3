use clap::{Args, Parser, Subcommand, ValueEnum};
use rjren_library::Mode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rjren", version, about = "Rename, move or link work folders using catalog metadata")]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML).
    #[arg(short, long, global = true, env = "RJREN_CONFIG")]
    pub config: Option<PathBuf>,
    /// More output; repeat for even more. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan each root and rename, move or link every work folder found.
    Run(RunArgs),
    /// Inspect or prune the metadata cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Folders to scan, processed one after the other.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,
    /// Overrides `renamer.mode`.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Overrides `renamer.move_root`.
    #[arg(long)]
    pub move_root: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List every cached work.
    List,
    /// Remove the given works from the cache.
    Forget {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Remove every cached work.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Rename,
    Move,
    Link,
}
impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Rename => Self::Rename,
            ModeArg::Move => Self::Move,
            ModeArg::Link => Self::Link,
        }
    }
}
