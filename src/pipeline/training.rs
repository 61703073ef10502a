//! Training loop for the maze Q-learning agent
//!
//! The trainer is the only component that knows about both the environment
//! and the agent. It drives episodes, folds per-episode metrics into running
//! aggregates, notifies observers, and honors cooperative cancellation at
//! episode boundaries.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    adapters::MsgPackRepository,
    error::{Error, Result},
    maze::{Action, CellKind, MazeConfig, MazeEnv},
    pipeline::observers::{CallbackObserver, TrainLogObserver},
    ports::{AgentRepository, Observer},
    q_learning::QLearningAgent,
};

/// Progress callback: receives the episode record and the running success
/// rate, returns `true` to continue training.
pub type ProgressCallback = Box<dyn FnMut(&EpisodeRecord, f64) -> bool + Send>;

/// Per-episode record handed to observers and folded into aggregates
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeRecord {
    /// Episode index (0-based)
    pub episode: usize,
    /// Sum of step rewards
    pub total_reward: f64,
    /// Steps taken, rejected moves included
    pub steps: usize,
    /// Whether the episode ended on the goal cell
    pub success: bool,
    /// Wall-clock duration of the episode
    pub duration: Duration,
    /// Agent exploration rate after the episode's decay
    pub exploration_rate: f64,
}

/// Aggregate result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes actually completed (may be fewer than requested after a stop)
    pub episodes_completed: usize,
    /// Episodes that ended on the goal cell
    pub successes: usize,
    /// Final running success rate
    pub success_rate: f64,
    /// Mean steps per completed episode
    pub mean_steps: f64,
    /// Mean total reward per completed episode
    pub mean_reward: f64,
    /// Total wall-clock training time in seconds
    pub total_duration_secs: f64,
    /// Whether an observer requested an early stop
    pub stopped_early: bool,
}

impl TrainingResult {
    /// Save the result to a JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a result from a JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Episodic training loop over an environment/agent pair
pub struct Trainer {
    episodes: usize,
    max_steps: usize,
    observers: Vec<Box<dyn Observer>>,
}

impl Trainer {
    /// Create a trainer.
    ///
    /// # Errors
    ///
    /// Rejects a zero episode count or step budget before any training runs.
    pub fn new(episodes: usize, max_steps: usize) -> Result<Self> {
        if episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episode count must be positive".to_string(),
            });
        }
        if max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "step budget per episode must be positive".to_string(),
            });
        }
        Ok(Self {
            episodes,
            max_steps,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run training episodes until the configured count is reached or an
    /// observer requests a stop. The aggregate summary is reported to
    /// observers in both cases; only an error skips it.
    pub fn run(&mut self, env: &mut MazeEnv, agent: &mut QLearningAgent) -> Result<TrainingResult> {
        let run_start = Instant::now();

        for observer in &mut self.observers {
            observer.on_training_start(self.episodes)?;
        }

        let mut completed = 0;
        let mut successes = 0;
        let mut reward_sum = 0.0;
        let mut step_sum = 0;
        let mut stopped = false;

        for episode in 0..self.episodes {
            let episode_start = Instant::now();
            let mut state = env.reset();

            for observer in &mut self.observers {
                observer.on_episode_start(episode, state)?;
            }

            let mut total_reward = 0.0;
            let mut steps = 0;
            let mut success = false;
            let mut done = false;

            while !done && steps < self.max_steps {
                let action = agent.select_action(state);
                let transition = env.step(action)?;

                for observer in &mut self.observers {
                    observer.on_step(episode, steps, Action::from_index(action)?, &transition)?;
                }

                agent.update(state, action, transition.reward, transition.position, transition.done)?;

                state = transition.position;
                total_reward += transition.reward;
                steps += 1;
                done = transition.done;
                success = done && transition.cell == CellKind::Goal;
            }

            completed += 1;
            if success {
                successes += 1;
            }
            let success_rate = successes as f64 / completed as f64;
            reward_sum += total_reward;
            step_sum += steps;

            let record = EpisodeRecord {
                episode,
                total_reward,
                steps,
                success,
                duration: episode_start.elapsed(),
                exploration_rate: agent.epsilon(),
            };

            for observer in &mut self.observers {
                if observer.on_episode_end(&record, success_rate)?.is_stop() {
                    stopped = true;
                }
            }
            if stopped {
                break;
            }
        }

        let result = TrainingResult {
            episodes_completed: completed,
            successes,
            success_rate: if completed > 0 {
                successes as f64 / completed as f64
            } else {
                0.0
            },
            mean_steps: if completed > 0 {
                step_sum as f64 / completed as f64
            } else {
                0.0
            },
            mean_reward: if completed > 0 {
                reward_sum / completed as f64
            } else {
                0.0
            },
            total_duration_secs: run_start.elapsed().as_secs_f64(),
            stopped_early: stopped,
        };

        for observer in &mut self.observers {
            observer.on_training_end(&result)?;
        }

        Ok(result)
    }
}

/// Full configuration surface for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Number of training episodes
    pub episodes: usize,
    /// Step budget per episode
    pub max_steps_per_episode: usize,
    /// Maze topology and marker placement
    pub maze: MazeConfig,
    /// α parameter
    pub learning_rate: f64,
    /// γ parameter
    pub discount_factor: f64,
    /// Initial exploration rate ε₀
    pub initial_epsilon: f64,
    /// Per-episode multiplicative ε decay
    pub epsilon_decay: f64,
    /// Seed the table from a previously persisted model if one exists
    pub load_previous: bool,
    /// Where the trained model is persisted
    pub model_path: PathBuf,
    /// Where the per-step/per-episode audit trail is written
    pub log_path: PathBuf,
    /// Seed for the agent's action-selection RNG
    pub seed: Option<u64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps_per_episode: 100,
            maze: MazeConfig::default(),
            learning_rate: 0.1,
            discount_factor: 0.95,
            initial_epsilon: 1.0,
            epsilon_decay: 0.995,
            load_previous: false,
            model_path: PathBuf::from("output/models/q_table.msgpack"),
            log_path: PathBuf::from("output/train_info/navigation.txt"),
            seed: None,
        }
    }
}

/// A trained agent together with the run's aggregate result
pub struct TrainOutcome {
    pub agent: QLearningAgent,
    pub result: TrainingResult,
}

/// Train an agent end to end.
///
/// Builds the environment and agent from `options`, optionally seeds the
/// table from a previously persisted model (a missing file falls back to a
/// fresh table; a corrupt one is fatal), runs the episode loop with the audit
/// log and the optional progress callback attached, then persists the final
/// table. Persistence and the final summary also run after a cooperative
/// stop; they are skipped only when the loop exits via an error.
pub fn train(options: &TrainOptions, callback: Option<ProgressCallback>) -> Result<TrainOutcome> {
    train_with_observers(options, Vec::new(), callback)
}

/// [`train`] with additional observers attached to the loop (progress bars,
/// CSV export, host-specific collectors).
pub fn train_with_observers(
    options: &TrainOptions,
    extra_observers: Vec<Box<dyn Observer>>,
    callback: Option<ProgressCallback>,
) -> Result<TrainOutcome> {
    let mut env = MazeEnv::new(&options.maze)?;

    let mut agent = QLearningAgent::new(
        options.learning_rate,
        options.discount_factor,
        options.initial_epsilon,
        options.epsilon_decay,
    );
    if let Some(seed) = options.seed {
        agent = agent.with_seed(seed);
    }

    let repository = MsgPackRepository::new();
    if options.load_previous {
        match repository.load(&options.model_path) {
            Ok(previous) => {
                agent = agent.with_q_table(previous.q_table().clone());
            }
            Err(Error::ModelNotFound { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    for path in [&options.model_path, &options.log_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                    operation: format!("create directory {}", parent.display()),
                    source,
                })?;
            }
        }
    }

    let mut trainer = Trainer::new(options.episodes, options.max_steps_per_episode)?
        .with_observer(Box::new(TrainLogObserver::create(&options.log_path)?));
    for observer in extra_observers {
        trainer = trainer.with_observer(observer);
    }
    if let Some(callback) = callback {
        trainer = trainer.with_observer(Box::new(CallbackObserver::new(callback)));
    }

    let result = trainer.run(&mut env, &mut agent)?;

    repository.save(&agent, &options.model_path)?;

    Ok(TrainOutcome { agent, result })
}

/// Result of a single greedy (ε = 0) evaluation episode
#[derive(Debug, Clone, Copy)]
pub struct Rollout {
    pub steps: usize,
    pub success: bool,
}

/// Roll out the greedy policy from the start position without learning or
/// exploration. Used for policy evaluation after training.
pub fn greedy_rollout(env: &mut MazeEnv, agent: &QLearningAgent, max_steps: usize) -> Result<Rollout> {
    let mut state = env.reset();
    let mut steps = 0;
    while steps < max_steps {
        let transition = env.step(agent.greedy_action(state))?;
        state = transition.position;
        steps += 1;
        if transition.done {
            return Ok(Rollout {
                steps,
                success: transition.cell == CellKind::Goal,
            });
        }
    }
    Ok(Rollout {
        steps,
        success: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Position;

    fn small_options(dir: &std::path::Path) -> TrainOptions {
        TrainOptions {
            episodes: 20,
            max_steps_per_episode: 50,
            maze: MazeConfig {
                rows: 3,
                cols: 3,
                walls: 0,
                start: Position::new(0, 0),
                goal: Position::new(2, 2),
                trap: None,
                seed: Some(1),
            },
            learning_rate: 0.5,
            discount_factor: 0.9,
            initial_epsilon: 1.0,
            epsilon_decay: 0.99,
            load_previous: false,
            model_path: dir.join("model.msgpack"),
            log_path: dir.join("navigation.txt"),
            seed: Some(42),
        }
    }

    #[test]
    fn trainer_rejects_zero_budgets() {
        assert!(Trainer::new(0, 10).is_err());
        assert!(Trainer::new(10, 0).is_err());
    }

    #[test]
    fn run_completes_all_episodes() {
        let tmp = tempfile::tempdir().unwrap();
        let options = small_options(tmp.path());

        let mut env = MazeEnv::new(&options.maze).unwrap();
        let mut agent = QLearningAgent::new(0.5, 0.9, 1.0, 0.99).with_seed(7);
        let mut trainer = Trainer::new(options.episodes, options.max_steps_per_episode).unwrap();

        let result = trainer.run(&mut env, &mut agent).unwrap();
        assert_eq!(result.episodes_completed, 20);
        assert!(!result.stopped_early);
        assert!(result.successes <= 20);
        assert!(agent.states_seen() > 0);
    }

    #[test]
    fn train_persists_model_and_log() {
        let tmp = tempfile::tempdir().unwrap();
        let options = small_options(tmp.path());

        let outcome = train(&options, None).unwrap();
        assert_eq!(outcome.result.episodes_completed, 20);
        assert!(options.model_path.exists());
        assert!(options.log_path.exists());

        let log = std::fs::read_to_string(&options.log_path).unwrap();
        assert!(log.contains("Episode 1/20"));
        assert!(log.contains("Training complete"));
    }

    #[test]
    fn load_previous_falls_back_on_missing_model() {
        let tmp = tempfile::tempdir().unwrap();
        let mut options = small_options(tmp.path());
        options.load_previous = true;

        // No model exists yet; training must start from a fresh table.
        let outcome = train(&options, None).unwrap();
        assert_eq!(outcome.result.episodes_completed, 20);
    }

    #[test]
    fn load_previous_fails_on_corrupt_model() {
        let tmp = tempfile::tempdir().unwrap();
        let mut options = small_options(tmp.path());
        options.load_previous = true;
        std::fs::write(&options.model_path, b"garbage").unwrap();

        assert!(matches!(
            train(&options, None),
            Err(Error::CorruptModel { .. })
        ));
    }

    #[test]
    fn load_previous_seeds_table_from_saved_model() {
        let tmp = tempfile::tempdir().unwrap();
        let options = small_options(tmp.path());

        let first = train(&options, None).unwrap();
        let states_before = first.agent.states_seen();
        assert!(states_before > 0);

        let mut resumed = small_options(tmp.path());
        resumed.load_previous = true;
        resumed.episodes = 1;
        // The resumed agent starts with every state the first run saw.
        let outcome = train(&resumed, None).unwrap();
        assert!(outcome.agent.states_seen() >= states_before);
    }

    #[test]
    fn callback_stop_cancels_at_episode_boundary() {
        let tmp = tempfile::tempdir().unwrap();
        let options = small_options(tmp.path());

        let outcome = train(
            &options,
            Some(Box::new(|record: &EpisodeRecord, _| record.episode < 4)),
        )
        .unwrap();

        // Stop requested at episode 4: episodes 0..=4 ran, nothing after.
        assert_eq!(outcome.result.episodes_completed, 5);
        assert!(outcome.result.stopped_early);
        // The table is still persisted after a cooperative stop.
        assert!(options.model_path.exists());
    }
}
