//! Tabular Q-learning: agent, sparse Q-table, and persistence
//!
//! The agent mixes random exploration (probability ε) with greedy
//! exploitation over a lazily-populated action-value table and applies the
//! off-policy TD(0) update after every real environment transition.

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::QLearningAgent;
pub use q_table::QTable;
pub use serialization::SavedAgent;
