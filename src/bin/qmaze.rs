//! qmaze CLI - train and evaluate tabular Q-learning maze agents

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qmaze")]
#[command(version, about = "Tabular Q-learning for grid mazes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent on a generated maze
    Train(qmaze::cli::commands::train::TrainArgs),

    /// Evaluate a trained agent with the greedy policy
    Evaluate(qmaze::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qmaze::cli::commands::train::execute(args),
        Commands::Evaluate(args) => qmaze::cli::commands::evaluate::execute(args),
    }
}
