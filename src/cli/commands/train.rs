//! Train command - run a full training session from the command line

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use crate::{
    export::CsvMetricsObserver,
    maze::{MazeConfig, Position},
    pipeline::{train_with_observers, ProgressObserver, TrainOptions},
    ports::Observer,
};

pub(crate) fn parse_position(value: &str, flag: &str) -> Result<Position> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("invalid value '{value}' for {flag} (expected 'row,col')"))?;
    let row = row
        .trim()
        .parse()
        .with_context(|| format!("invalid row in {flag} value '{value}'"))?;
    let col = col
        .trim()
        .parse()
        .with_context(|| format!("invalid column in {flag} value '{value}'"))?;
    Ok(Position::new(row, col))
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a maze agent")]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
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

    /// Learning rate (alpha)
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Discount factor (gamma)
    #[arg(long, default_value_t = 0.95)]
    pub discount_factor: f64,

    /// Initial exploration rate
    #[arg(long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Per-episode exploration decay
    #[arg(long, default_value_t = 0.995)]
    pub epsilon_decay: f64,

    /// Start position as 'row,col'
    #[arg(long, default_value = "0,0")]
    pub start: String,

    /// Goal position as 'row,col' (defaults to the bottom-right cell)
    #[arg(long)]
    pub goal: Option<String>,

    /// Trap position as 'row,col'
    #[arg(long)]
    pub trap: Option<String>,

    /// Seed the table from a previously saved model if one exists
    #[arg(long, default_value_t = false)]
    pub load_previous: bool,

    /// Output file for the trained model
    #[arg(long, short = 'O', default_value = "output/models/q_table.msgpack")]
    pub model: PathBuf,

    /// Training log file
    #[arg(long, default_value = "output/train_info/navigation.txt")]
    pub log: PathBuf,

    /// Optional per-episode metrics CSV file
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Random seed for action selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Random seed for wall generation
    #[arg(long)]
    pub maze_seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl TrainArgs {
    fn into_options(self) -> Result<(TrainOptions, Option<PathBuf>, Option<PathBuf>, bool)> {
        let start = parse_position(&self.start, "--start")?;
        let goal = match &self.goal {
            Some(value) => parse_position(value, "--goal")?,
            None => Position::new(self.rows.saturating_sub(1), self.cols.saturating_sub(1)),
        };
        let trap = self
            .trap
            .as_deref()
            .map(|value| parse_position(value, "--trap"))
            .transpose()?;

        let options = TrainOptions {
            episodes: self.episodes,
            max_steps_per_episode: self.max_steps,
            maze: MazeConfig {
                rows: self.rows,
                cols: self.cols,
                walls: self.walls,
                start,
                goal,
                trap,
                seed: self.maze_seed,
            },
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
            initial_epsilon: self.epsilon,
            epsilon_decay: self.epsilon_decay,
            load_previous: self.load_previous,
            model_path: self.model,
            log_path: self.log,
            seed: self.seed,
        };
        Ok((options, self.metrics, self.summary, !self.no_progress))
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let (options, metrics, summary, progress) = args.into_options()?;

    let mut observers: Vec<Box<dyn Observer>> = Vec::new();
    if progress {
        observers.push(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &metrics {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        observers.push(Box::new(CsvMetricsObserver::create(path)?));
    }

    let outcome = train_with_observers(&options, observers, None)?;

    println!(
        "Trained {} episodes: success rate {:.1}%, mean steps {:.1}, mean reward {:.3}, {} states seen",
        outcome.result.episodes_completed,
        outcome.result.success_rate * 100.0,
        outcome.result.mean_steps,
        outcome.result.mean_reward,
        outcome.agent.states_seen()
    );
    println!("Model saved to {}", options.model_path.display());

    if let Some(raw) = summary {
        let path = sanitize_summary_path(&raw);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        outcome.result.save(&path)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        assert_eq!(parse_position("2,3", "--start").unwrap(), Position::new(2, 3));
        assert_eq!(parse_position(" 0 , 5 ", "--goal").unwrap(), Position::new(0, 5));
        assert!(parse_position("2;3", "--start").is_err());
        assert!(parse_position("a,b", "--start").is_err());
    }

    #[test]
    fn summary_path_gains_json_extension() {
        assert_eq!(
            sanitize_summary_path(Path::new("run_overview")),
            PathBuf::from("run_overview.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("results.JSON")),
            PathBuf::from("results.JSON")
        );
    }

    #[test]
    fn summary_directory_gets_default_filename() {
        let arg = format!("summaries{}", std::path::MAIN_SEPARATOR);
        assert_eq!(
            sanitize_summary_path(Path::new(&arg)),
            Path::new("summaries").join("training_summary.json")
        );
    }
}
