//! Tabular Q-learning agent
//!
//! Epsilon-greedy action selection over a lazily-populated Q-table, with the
//! standard off-policy TD(0) update. The exploration rate decays geometrically
//! exactly once per episode, triggered by the terminal update.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    maze::{Action, Position},
    q_learning::q_table::QTable,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub q_table: QTable,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    learning_rate: f64,
    discount_factor: f64,
    epsilon: f64,
    initial_epsilon: f64,
    epsilon_decay: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - α parameter (0.0 to 1.0)
    /// * `discount_factor` - γ parameter (0.0 to 1.0)
    /// * `epsilon` - Initial exploration rate
    /// * `epsilon_decay` - Multiplicative decay per episode
    pub fn new(learning_rate: f64, discount_factor: f64, epsilon: f64, epsilon_decay: f64) -> Self {
        Self {
            q_table: QTable::new(),
            learning_rate,
            discount_factor,
            epsilon,
            initial_epsilon: epsilon,
            epsilon_decay,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    /// Replace the agent's table, e.g. with one loaded from disk
    pub fn with_q_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    /// ε-greedy action selection.
    ///
    /// The exploration branch draws a uniform action without touching the
    /// table; only exploitation materializes an entry for the state.
    pub fn select_action(&mut self, state: Position) -> usize {
        if self.rng.random::<f64>() < self.epsilon {
            self.rng.random_range(0..Action::COUNT)
        } else {
            self.q_table.ensure(state);
            self.q_table.greedy_action(state)
        }
    }

    /// Greedy (ε = 0) action for policy evaluation. Read-only: never creates
    /// table entries; an unseen state resolves to action 0.
    pub fn greedy_action(&self, state: Position) -> usize {
        self.q_table.greedy_action(state)
    }

    /// Q-learning update for one real environment transition.
    ///
    /// `Q(s,a) ← (1-α)·Q(s,a) + α·target` with `target = r` on terminal
    /// transitions and `r + γ·max_a' Q(s',a')` otherwise. A terminal update
    /// also decays ε, once per episode; non-terminal steps never decay it.
    pub fn update(
        &mut self,
        state: Position,
        action: usize,
        reward: f64,
        next_state: Position,
        done: bool,
    ) -> Result<()> {
        let action = Action::from_index(action)?;

        self.q_table.ensure(state);
        self.q_table.ensure(next_state);

        let target = if done {
            reward
        } else {
            reward + self.discount_factor * self.q_table.max_value(next_state)
        };
        let old_value = self.q_table.value(state, action.index());
        let new_value = (1.0 - self.learning_rate) * old_value + self.learning_rate * target;
        self.q_table.set_value(state, action.index(), new_value);

        if done {
            self.epsilon *= self.epsilon_decay;
        }

        Ok(())
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Number of states the table has materialized
    pub fn states_seen(&self) -> usize {
        self.q_table.len()
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            q_table: self.q_table.clone(),
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
            epsilon: self.epsilon,
            initial_epsilon: self.initial_epsilon,
            epsilon_decay: self.epsilon_decay,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState) -> Self {
        Self {
            q_table: state.q_table,
            learning_rate: state.learning_rate,
            discount_factor: state.discount_factor,
            epsilon: state.epsilon,
            initial_epsilon: state.initial_epsilon,
            epsilon_decay: state.epsilon_decay,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition() -> (Position, Position) {
        (Position::new(0, 0), Position::new(0, 1))
    }

    #[test]
    fn update_moves_value_toward_target() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(0.5, 0.9, 0.0, 1.0);
        agent.update(s, 3, -0.01, s2, false).unwrap();
        // Both rows start at zero, so target = -0.01 and Q = 0.5 * -0.01.
        assert_eq!(agent.q_table().value(s, 3), -0.005);
    }

    #[test]
    fn terminal_update_ignores_next_state_values() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(1.0, 0.9, 0.0, 1.0);
        agent.q_table.set_value(s2, 0, 100.0);
        agent.update(s, 1, 1.0, s2, true).unwrap();
        assert_eq!(agent.q_table().value(s, 1), 1.0);
    }

    #[test]
    fn update_materializes_both_states() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(0.1, 0.95, 1.0, 0.995);
        agent.update(s, 0, -0.01, s2, false).unwrap();
        assert!(agent.q_table().contains(s));
        assert!(agent.q_table().contains(s2));
    }

    #[test]
    fn update_rejects_out_of_range_action() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(0.1, 0.95, 1.0, 0.995);
        assert!(agent.update(s, 7, 0.0, s2, false).is_err());
    }

    #[test]
    fn epsilon_decays_only_on_terminal_updates() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(0.5, 0.9, 1.0, 0.99);
        for _ in 0..10 {
            agent.update(s, 0, -0.01, s2, false).unwrap();
        }
        assert_eq!(agent.epsilon(), 1.0);

        agent.update(s, 0, 1.0, s2, true).unwrap();
        assert_eq!(agent.epsilon(), 0.99);
    }

    #[test]
    fn epsilon_follows_geometric_schedule() {
        let (s, s2) = transition();
        let mut agent = QLearningAgent::new(0.5, 0.9, 1.0, 0.95);
        for _ in 0..5 {
            agent.update(s, 0, 1.0, s2, true).unwrap();
        }
        let expected = 0.95f64.powi(5);
        assert!((agent.epsilon() - expected).abs() < 1e-12);
    }

    #[test]
    fn exploration_never_touches_the_table() {
        let mut agent = QLearningAgent::new(0.1, 0.95, 1.0, 0.995).with_seed(42);
        // With ε = 1.0 every selection explores.
        for _ in 0..50 {
            let action = agent.select_action(Position::new(1, 1));
            assert!(action < Action::COUNT);
        }
        assert_eq!(agent.states_seen(), 0);
    }

    #[test]
    fn exploitation_materializes_state_and_is_greedy() {
        let mut agent = QLearningAgent::new(0.1, 0.95, 0.0, 0.995).with_seed(42);
        let s = Position::new(2, 3);
        agent.q_table.set_value(s, 2, 0.8);
        assert_eq!(agent.select_action(s), 2);
        assert!(agent.q_table().contains(s));
    }

    #[test]
    fn deterministic_replay_produces_identical_tables() {
        let steps = [
            (Position::new(0, 0), 3, -0.01, Position::new(0, 1), false),
            (Position::new(0, 1), 1, -0.01, Position::new(1, 1), false),
            (Position::new(1, 1), 1, -0.01, Position::new(1, 1), false),
            (Position::new(1, 1), 3, 1.0, Position::new(1, 2), true),
            (Position::new(0, 0), 3, -0.01, Position::new(0, 1), false),
            (Position::new(0, 1), 2, -1.0, Position::new(0, 0), true),
        ];

        let replay = || {
            let mut agent = QLearningAgent::new(0.5, 0.9, 1.0, 0.99);
            for &(s, a, r, s2, done) in &steps {
                agent.update(s, a, r, s2, done).unwrap();
            }
            agent
        };

        let a = replay();
        let b = replay();
        assert_eq!(a.q_table(), b.q_table());
        for (state, row) in a.q_table().iter() {
            for (i, value) in row.iter().enumerate() {
                // Bit-identical, not merely approximately equal.
                assert_eq!(
                    value.to_bits(),
                    b.q_table().value(*state, i).to_bits()
                );
            }
        }
    }
}
