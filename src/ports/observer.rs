//! Observer port - abstraction for training observation and data collection
//!
//! Observers receive training lifecycle events from the trainer, allowing
//! composable data collection (progress bars, metrics, audit logs, host
//! callbacks) without coupling the training loop to any output format.
//!
//! # Event sequence
//!
//! 1. `on_training_start(total_episodes)` - once at the beginning
//! 2. For each episode:
//!    - `on_episode_start(episode, start)`
//!    - `on_step(...)` - for each step, including rejected moves
//!    - `on_episode_end(record, success_rate)` - may request a stop
//! 3. `on_training_end(result)` - once at the end, also after a cooperative
//!    stop (but not after an error)

use crate::{
    maze::{Action, Position, Transition},
    pipeline::training::{EpisodeRecord, TrainingResult},
    Result,
};

/// Continue/stop decision returned from `on_episode_end`.
///
/// A stop is observed at episode granularity only: the trainer finishes the
/// current episode, skips the rest, and still runs persistence and the final
/// summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Stop,
}

impl Signal {
    pub fn is_stop(self) -> bool {
        matches!(self, Signal::Stop)
    }
}

/// Observer trait for monitoring training.
///
/// All methods are defaulted so implementations only handle the events they
/// care about. Observers are `Send` so a host can drive training from a
/// worker thread and marshal records back to its own thread; the trainer
/// never shares mutable state with observers beyond these calls.
pub trait Observer: Send {
    /// Called once before the first episode.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode begins, after the environment reset.
    fn on_episode_start(&mut self, _episode: usize, _start: Position) -> Result<()> {
        Ok(())
    }

    /// Called after every environment step, including rejected moves.
    fn on_step(
        &mut self,
        _episode: usize,
        _step: usize,
        _action: Action,
        _transition: &Transition,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an episode completes. Returning [`Signal::Stop`] cancels
    /// the run cooperatively at this episode boundary.
    fn on_episode_end(&mut self, _record: &EpisodeRecord, _success_rate: f64) -> Result<Signal> {
        Ok(Signal::Continue)
    }

    /// Called once when training completes, whether all episodes ran or a
    /// stop was requested.
    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        Ok(())
    }
}
