//! Serialization support for trained agents.
//!
//! Agents persist as a versioned MessagePack blob: format version,
//! hyperparameters, and the table keyed by (row, col) pairs. Round trips are
//! bit-exact for every stored value. A missing file and an undecodable file
//! are distinct errors so callers can fall back on the former only.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    q_learning::agent::{AgentState, QLearningAgent},
};

/// Versioned on-disk representation of a trained agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    state: AgentState,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
        }
    }

    /// Rebuild an agent, rejecting unknown format versions
    pub fn into_agent(self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedModelVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(QLearningAgent::from_state(self.state))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create model file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).map_err(|e| Error::SerializationContext {
            operation: "serialize agent to MessagePack".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// Load a saved agent.
    ///
    /// # Errors
    ///
    /// * [`Error::ModelNotFound`] if the file does not exist (recoverable)
    /// * [`Error::CorruptModel`] if it exists but cannot be decoded
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::ModelNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io {
                    operation: format!("open model file {}", path.display()),
                    source,
                }
            }
        })?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).map_err(|e| Error::CorruptModel {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
