use clap::{Parser, Subcommand};

use self::{evolve::EvolveArg, inspect_data::InspectDataArg};

mod evolve;
mod inspect_data;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Optimize team compositions with the genetic algorithm
    Evolve(#[clap(flatten)] EvolveArg),
    /// Load a game data file and summarize its tables
    InspectData(#[clap(flatten)] InspectDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evolve(arg) => evolve::run(&arg)?,
        Mode::InspectData(arg) => inspect_data::run(&arg)?,
    }
    Ok(())
}
