//! Repository port for agent persistence.
//!
//! Abstracts the storage mechanism for trained agents so the training loop
//! never depends on a specific serialization format.

use std::path::Path;

use crate::{q_learning::QLearningAgent, Result};

/// Port for persisting and loading trained agents.
pub trait AgentRepository {
    /// Save an agent to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization fails.
    fn save(&self, agent: &QLearningAgent, path: &Path) -> Result<()>;

    /// Load an agent from persistent storage.
    ///
    /// # Errors
    ///
    /// * [`crate::Error::ModelNotFound`] if nothing exists at `path`
    /// * [`crate::Error::CorruptModel`] if the file cannot be decoded
    fn load(&self, path: &Path) -> Result<QLearningAgent>;
}
