//! Observer implementations for the training loop
//!
//! Observers compose data collection without coupling the trainer to output
//! formats: a progress bar, aggregate metrics, the human-readable audit
//! trail, and an adapter for host progress callbacks.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    maze::{Action, Position, Transition},
    pipeline::training::{EpisodeRecord, ProgressCallback, TrainingResult},
    ports::{Observer, Signal},
    Result,
};

/// Progress bar observer - shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord, success_rate: f64) -> Result<Signal> {
        if record.success {
            self.successes += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.set_position(record.episode as u64 + 1);
            pb.set_message(format!(
                "goal {} | rate {:.0}% | eps {:.2}",
                self.successes,
                success_rate * 100.0,
                record.exploration_rate
            ));
        }
        Ok(Signal::Continue)
    }

    fn on_training_end(&mut self, result: &TrainingResult) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!(
                "goal {} | rate {:.0}%",
                result.successes,
                result.success_rate * 100.0
            ));
        }
        Ok(())
    }
}

/// Metrics observer - accumulates per-episode metrics
pub struct MetricsObserver {
    episodes: usize,
    successes: usize,
    step_counts: Vec<usize>,
    rewards: Vec<f64>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            episodes: 0,
            successes: 0,
            step_counts: Vec::new(),
            rewards: Vec::new(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }

    pub fn avg_steps(&self) -> f64 {
        if self.step_counts.is_empty() {
            0.0
        } else {
            self.step_counts.iter().sum::<usize>() as f64 / self.step_counts.len() as f64
        }
    }

    pub fn avg_reward(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().sum::<f64>() / self.rewards.len() as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            successes: self.successes,
            success_rate: self.success_rate(),
            avg_steps: self.avg_steps(),
            avg_reward: self.avg_reward(),
        }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of accumulated training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub avg_steps: f64,
    pub avg_reward: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, record: &EpisodeRecord, _success_rate: f64) -> Result<Signal> {
        self.episodes += 1;
        if record.success {
            self.successes += 1;
        }
        self.step_counts.push(record.steps);
        self.rewards.push(record.total_reward);
        Ok(Signal::Continue)
    }
}

/// Audit-trail observer - writes the human-readable training log
///
/// One line-block per step and per episode, appended during the run to a sink
/// created fresh (truncated) at construction, with a final aggregate summary
/// at the end. Write failures surface as [`Error::Io`]; they are never
/// swallowed.
pub struct TrainLogObserver {
    writer: BufWriter<File>,
    total_episodes: usize,
}

impl TrainLogObserver {
    /// Create the log sink, truncating any previous run's file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("create training log {}", path.as_ref().display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            total_episodes: 0,
        })
    }

    fn write_block(&mut self, block: &str) -> Result<()> {
        writeln!(self.writer, "{block}").map_err(|source| Error::Io {
            operation: "write training log".to_string(),
            source,
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| Error::Io {
            operation: "flush training log".to_string(),
            source,
        })
    }
}

impl Observer for TrainLogObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.total_episodes = total_episodes;
        Ok(())
    }

    fn on_episode_start(&mut self, episode: usize, start: Position) -> Result<()> {
        self.write_block(&format!(
            "\nEpisode {}/{} started\nStarting position: {start}",
            episode + 1,
            self.total_episodes
        ))
    }

    fn on_step(
        &mut self,
        _episode: usize,
        step: usize,
        action: Action,
        transition: &Transition,
    ) -> Result<()> {
        self.write_block(&format!(
            "Step {}:\nAction: {}\nCurrent position: {}\nNext position: {}\nReward: {:.2}",
            step + 1,
            action.name(),
            transition.previous,
            transition.position,
            transition.reward
        ))?;
        if transition.done {
            let note = match transition.cell {
                crate::maze::CellKind::Goal => "  Goal reached!",
                _ => "  Trap hit!",
            };
            self.write_block(note)?;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord, success_rate: f64) -> Result<Signal> {
        self.write_block(&format!(
            "\nEpisode {} summary:\nSuccess rate: {:.2}%\nTotal reward: {:.2}\nSteps taken: {}\nEpisode time: {:.2} seconds\nExploration rate: {:.2}\n{}",
            record.episode + 1,
            success_rate * 100.0,
            record.total_reward,
            record.steps,
            record.duration.as_secs_f64(),
            record.exploration_rate,
            "-".repeat(50)
        ))?;
        self.flush()?;
        Ok(Signal::Continue)
    }

    fn on_training_end(&mut self, result: &TrainingResult) -> Result<()> {
        self.write_block(&format!(
            "\nTraining complete!\nTotal training time: {:.2} seconds\nFinal success rate: {:.2}%\nAverage steps per episode: {:.2}\nAverage reward per episode: {:.2}",
            result.total_duration_secs,
            result.success_rate * 100.0,
            result.mean_steps,
            result.mean_reward
        ))?;
        self.flush()
    }
}

/// Adapter turning a host progress callback into an observer.
///
/// The callback receives the episode record and the running success rate; a
/// `false` return requests a cooperative stop.
pub struct CallbackObserver {
    callback: ProgressCallback,
}

impl CallbackObserver {
    pub fn new(callback: ProgressCallback) -> Self {
        Self { callback }
    }
}

impl Observer for CallbackObserver {
    fn on_episode_end(&mut self, record: &EpisodeRecord, success_rate: f64) -> Result<Signal> {
        if (self.callback)(record, success_rate) {
            Ok(Signal::Continue)
        } else {
            Ok(Signal::Stop)
        }
    }
}
