//! Q-table implementation for tabular Q-learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::maze::{Action, Position};

const ZERO_ROW: [f64; Action::COUNT] = [0.0; Action::COUNT];

/// Sparse action-value table mapping positions to fixed-length value vectors.
///
/// Entries are created on demand with all-zero values; the table grows
/// monotonically during training and is never shrunk, only overwritten
/// entry-by-entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: HashMap<Position, [f64; Action::COUNT]>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states with an entry
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether a state has been materialized
    pub fn contains(&self, state: Position) -> bool {
        self.values.contains_key(&state)
    }

    /// Action-value vector for a state, all zeros if absent (no insertion)
    pub fn row(&self, state: Position) -> &[f64; Action::COUNT] {
        self.values.get(&state).unwrap_or(&ZERO_ROW)
    }

    /// Materialize the entry for a state, zero-initialized if new
    pub fn ensure(&mut self, state: Position) -> &mut [f64; Action::COUNT] {
        self.values.entry(state).or_insert(ZERO_ROW)
    }

    /// Q-value for a state-action pair (zero if the state is absent)
    pub fn value(&self, state: Position, action: usize) -> f64 {
        self.row(state)[action]
    }

    /// Overwrite a single action-value
    pub fn set_value(&mut self, state: Position, action: usize, value: f64) {
        self.ensure(state)[action] = value;
    }

    /// Maximum action-value for a state (zero if absent)
    pub fn max_value(&self, state: Position) -> f64 {
        self.row(state).iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
    }

    /// Greedy action for a state, ties broken by lowest action index.
    ///
    /// Read-only: an absent state resolves to all zeros and therefore action 0.
    pub fn greedy_action(&self, state: Position) -> usize {
        let row = self.row(state);
        let mut best = 0;
        for (action, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = action;
            }
        }
        best
    }

    /// Iterate over materialized entries
    pub fn iter(&self) -> impl Iterator<Item = (&Position, &[f64; Action::COUNT])> {
        self.values.iter()
    }
}
