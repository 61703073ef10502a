//! Tabular Q-learning for procedurally-walled grid mazes
//!
//! This crate provides:
//! - A grid-maze environment with random wall topology, wall-aware movement,
//!   and a goal/trap reward policy
//! - A tabular Q-learning agent with epsilon-greedy exploration and geometric
//!   exploration decay
//! - An episodic training loop with composable observers (progress bar,
//!   metrics, audit log, host callbacks) and cooperative cancellation
//! - Versioned MessagePack persistence for trained agents
//!
//! The training core is fully synchronous; interactive hosts are expected to
//! run it on a worker thread and consume episode records through an observer
//! or the progress callback.

pub mod adapters;
pub mod cli;
pub mod error;
pub mod export;
pub mod maze;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use error::{Error, Result};
pub use maze::{Action, CellKind, Grid, MazeConfig, MazeEnv, Position, Transition};
pub use pipeline::{
    train, EpisodeRecord, TrainOptions, TrainOutcome, Trainer, TrainingResult,
};
pub use q_learning::{QLearningAgent, QTable, SavedAgent};
