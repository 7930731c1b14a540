use clap::{Parser, Subcommand};

use self::{
    default_config::DefaultConfigArg, replay::ReplayArg, show::ShowArg, train::TrainArg,
};

mod default_config;
mod replay;
mod show;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve an action plan against the course simulator
    Train(#[clap(flatten)] TrainArg),
    /// Replay a saved action plan and report how it scores
    Replay(#[clap(flatten)] ReplayArg),
    /// Print a saved action plan gene by gene
    Show(#[clap(flatten)] ShowArg),
    /// Write the default configuration file
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Show(arg) => show::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}
