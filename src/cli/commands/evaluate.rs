//! Evaluate command - greedy rollout of a trained agent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    cli::commands::train::parse_position,
    maze::{MazeConfig, MazeEnv, Position},
    pipeline::greedy_rollout,
    ports::AgentRepository,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained maze agent with the greedy policy")]
pub struct EvaluateArgs {
    /// Path to the trained model
    pub model: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Grid rows
    #[arg(long, default_value_t = 6)]
    pub rows: usize,

    /// Grid columns
    #[arg(long, default_value_t = 6)]
    pub cols: usize,

    /// Number of wall placement draws
    #[arg(long, short = 'w', default_value_t = 10)]
    pub walls: usize,

    /// Step budget per episode
    #[arg(long, default_value_t = 100)]
    pub max_steps: usize,

    /// Start position as 'row,col'
    #[arg(long, default_value = "0,0")]
    pub start: String,

    /// Goal position as 'row,col' (defaults to the bottom-right cell)
    #[arg(long)]
    pub goal: Option<String>,

    /// Trap position as 'row,col'
    #[arg(long)]
    pub trap: Option<String>,

    /// Random seed for wall generation (use the training seed to evaluate on
    /// the same maze)
    #[arg(long)]
    pub maze_seed: Option<u64>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let repository = MsgPackRepository::new();
    let agent = repository
        .load(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;

    let start = parse_position(&args.start, "--start")?;
    let goal = match &args.goal {
        Some(value) => parse_position(value, "--goal")?,
        None => Position::new(args.rows.saturating_sub(1), args.cols.saturating_sub(1)),
    };
    let trap = args
        .trap
        .as_deref()
        .map(|value| parse_position(value, "--trap"))
        .transpose()?;

    let config = MazeConfig {
        rows: args.rows,
        cols: args.cols,
        walls: args.walls,
        start,
        goal,
        trap,
        seed: args.maze_seed,
    };
    let mut env = MazeEnv::new(&config)?;

    let mut successes = 0;
    let mut step_sum = 0;
    for _ in 0..args.episodes {
        let rollout = greedy_rollout(&mut env, &agent, args.max_steps)?;
        if rollout.success {
            successes += 1;
        }
        step_sum += rollout.steps;
    }

    let episodes = args.episodes.max(1);
    println!(
        "Greedy evaluation over {} episodes: success rate {:.1}%, mean steps {:.1}",
        args.episodes,
        successes as f64 / episodes as f64 * 100.0,
        step_sum as f64 / episodes as f64
    );

    Ok(())
}
