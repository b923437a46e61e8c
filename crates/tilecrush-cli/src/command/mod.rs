use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilecrush_engine::{ColorSeed, EngineConfig};

use crate::util;

use self::{show::ShowArg, simulate::SimulateArg, swap::SwapArg};

mod show;
mod simulate;
mod swap;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print a freshly generated board
    Show(#[clap(flatten)] ShowArg),
    /// Apply one swap to a board file and resolve the cascade
    Swap(#[clap(flatten)] SwapArg),
    /// Auto-play random valid swaps and record the session
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Options shared by commands that start a session.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Color seed as 32 hex digits (overrides the config file)
    #[arg(long)]
    seed: Option<ColorSeed>,
}

impl ConfigArg {
    /// Loads the configuration and pins its seed, drawing one if neither the
    /// file nor the command line gives it.
    pub(crate) fn load(&self) -> anyhow::Result<(EngineConfig, ColorSeed)> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok((config.with_seed(seed), seed))
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Show(arg) => show::run(&arg)?,
        Mode::Swap(arg) => swap::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
