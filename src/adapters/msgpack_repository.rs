//! MessagePack implementation of the agent repository.

use std::path::Path;

use crate::{
    ports::AgentRepository,
    q_learning::{QLearningAgent, SavedAgent},
    Result,
};

/// MessagePack-based agent repository.
///
/// Stores agents as versioned binary blobs via rmp_serde. MessagePack keeps
/// f64 values bit-exact, which the save/load round-trip contract requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl AgentRepository for MsgPackRepository {
    fn save(&self, agent: &QLearningAgent, path: &Path) -> Result<()> {
        SavedAgent::from_agent(agent).save_to_file(path)
    }

    fn load(&self, path: &Path) -> Result<QLearningAgent> {
        SavedAgent::load_from_file(path)?.into_agent()
    }
}
