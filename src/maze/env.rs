//! Maze environment: action space, movement resolution, reward policy
//!
//! The environment owns the grid and the agent's position. `step` resolves a
//! discrete action against the wall topology and derives the reward and
//! termination signal from the cell the agent ends up in. A rejected move
//! leaves the position unchanged but still re-evaluates the current cell, so
//! an agent already occupying a terminal cell receives the terminal reward
//! even when bouncing against a wall. This is deliberate and load-bearing.

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    maze::grid::{CellKind, Grid, Position},
};

/// Reward for reaching the goal cell
pub const GOAL_REWARD: f64 = 1.0;
/// Reward for stepping into the trap cell
pub const TRAP_REWARD: f64 = -1.0;
/// Per-step cost on free cells, encouraging shortest paths
pub const STEP_COST: f64 = -0.01;

/// Discrete action with a fixed mapping to coordinate deltas.
///
/// Index order (0=up, 1=down, 2=left, 3=right) is part of the persisted table
/// format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Size of the action space
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    /// Decode an action index, rejecting anything outside the action space
    pub fn from_index(index: usize) -> Result<Action> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidAction { action: index })
    }

    /// (row, col) delta applied by this action
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// The mirrored side on the neighbor across this direction
    pub fn opposite(self) -> Action {
        match self {
            Action::Up => Action::Down,
            Action::Down => Action::Up,
            Action::Left => Action::Right,
            Action::Right => Action::Left,
        }
    }

    /// Human-readable name used in the training log
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "Up",
            Action::Down => "Down",
            Action::Left => "Left",
            Action::Right => "Right",
        }
    }
}

/// Maze environment configuration.
///
/// Validated in full by [`MazeEnv::new`] before any training begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Number of wall placement draws (distinct segments may be fewer)
    pub walls: usize,
    /// Fixed start position for every episode
    pub start: Position,
    /// Goal cell (marker 2)
    pub goal: Position,
    /// Optional trap cell (marker -2)
    pub trap: Option<Position>,
    /// Seed for wall generation
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            walls: 10,
            start: Position::new(0, 0),
            goal: Position::new(5, 5),
            trap: None,
            seed: None,
        }
    }
}

impl MazeConfig {
    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid dimensions must be positive, got {}x{}", self.rows, self.cols),
            });
        }
        if self.walls > 0 && (self.rows < 2 || self.cols < 2) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "cannot place walls on a {}x{} grid (need at least 2x2)",
                    self.rows, self.cols
                ),
            });
        }
        for (name, pos) in [
            ("start", Some(self.start)),
            ("goal", Some(self.goal)),
            ("trap", self.trap),
        ] {
            if let Some(pos) = pos {
                if pos.row >= self.rows || pos.col >= self.cols {
                    return Err(Error::InvalidConfiguration {
                        message: format!("{name} position {pos} is outside the {}x{} grid", self.rows, self.cols),
                    });
                }
            }
        }
        if self.goal == self.start {
            return Err(Error::InvalidConfiguration {
                message: "goal must differ from the start position".to_string(),
            });
        }
        if self.trap == Some(self.goal) {
            return Err(Error::InvalidConfiguration {
                message: "trap must differ from the goal position".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of a single environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Position before the step (for renderers)
    pub previous: Position,
    /// Position after the step (unchanged if the move was rejected)
    pub position: Position,
    /// Reward derived from the resulting cell
    pub reward: f64,
    /// Whether the episode is over
    pub done: bool,
    /// Marker of the resulting cell
    pub cell: CellKind,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Grid-maze environment with wall-aware movement
#[derive(Debug, Clone)]
pub struct MazeEnv {
    grid: Grid,
    start: Position,
    agent_pos: Position,
    previous_pos: Position,
}

impl MazeEnv {
    /// Build the environment: validate the configuration, generate the wall
    /// topology, and place the goal/trap markers. The grid is frozen after
    /// this point.
    pub fn new(config: &MazeConfig) -> Result<Self> {
        config.validate()?;

        let mut grid = Grid::new(config.rows, config.cols);
        let mut rng = build_rng(config.seed);
        grid.generate_walls(config.walls, &mut rng);
        grid.set_marker(config.goal, CellKind::Goal);
        if let Some(trap) = config.trap {
            grid.set_marker(trap, CellKind::Trap);
        }

        Ok(Self {
            grid,
            start: config.start,
            agent_pos: config.start,
            previous_pos: config.start,
        })
    }

    /// Reset the agent to the fixed start position
    pub fn reset(&mut self) -> Position {
        self.agent_pos = self.start;
        self.previous_pos = self.start;
        self.agent_pos
    }

    /// Resolve one action.
    ///
    /// The move is accepted only if the candidate cell is within bounds and
    /// the departure cell has no wall in that direction. Only the departure
    /// cell's flag is consulted; the mirrored flag on the destination is
    /// guaranteed by the wall invariant.
    pub fn step(&mut self, action: usize) -> Result<Transition> {
        let action = Action::from_index(action)?;
        self.previous_pos = self.agent_pos;

        if let Some(candidate) = self.agent_pos.neighbor(action) {
            if self.grid.contains(candidate) && !self.grid.cell(self.agent_pos).has_wall(action) {
                self.agent_pos = candidate;
            }
        }

        let cell = self.grid.cell(self.agent_pos).kind;
        let reward = match cell {
            CellKind::Goal => GOAL_REWARD,
            CellKind::Trap => TRAP_REWARD,
            CellKind::Free => STEP_COST,
        };

        Ok(Transition {
            previous: self.previous_pos,
            position: self.agent_pos,
            reward,
            done: cell.is_terminal(),
            cell,
        })
    }

    /// Current agent position
    pub fn position(&self) -> Position {
        self.agent_pos
    }

    /// Position before the last step, for renderers animating the transition
    pub fn previous_position(&self) -> Position {
        self.previous_pos
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config(rows: usize, cols: usize) -> MazeConfig {
        MazeConfig {
            rows,
            cols,
            walls: 0,
            start: Position::new(0, 0),
            goal: Position::new(rows - 1, cols - 1),
            trap: None,
            seed: Some(0),
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        let config = MazeConfig {
            rows: 0,
            ..MazeConfig::default()
        };
        assert!(matches!(
            MazeEnv::new(&config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_walls_on_degenerate_grid() {
        let config = MazeConfig {
            rows: 1,
            cols: 5,
            walls: 3,
            start: Position::new(0, 0),
            goal: Position::new(0, 4),
            trap: None,
            seed: None,
        };
        assert!(matches!(
            MazeEnv::new(&config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_out_of_bounds_markers() {
        let config = MazeConfig {
            goal: Position::new(9, 9),
            ..MazeConfig::default()
        };
        assert!(matches!(
            MazeEnv::new(&config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_invalid_action_index() {
        let mut env = MazeEnv::new(&open_config(3, 3)).unwrap();
        assert!(matches!(env.step(4), Err(Error::InvalidAction { action: 4 })));
    }

    #[test]
    fn moves_follow_fixed_deltas() {
        let mut env = MazeEnv::new(&open_config(3, 3)).unwrap();
        let t = env.step(Action::Down.index()).unwrap();
        assert_eq!(t.position, Position::new(1, 0));
        let t = env.step(Action::Right.index()).unwrap();
        assert_eq!(t.position, Position::new(1, 1));
        let t = env.step(Action::Up.index()).unwrap();
        assert_eq!(t.position, Position::new(0, 1));
        let t = env.step(Action::Left.index()).unwrap();
        assert_eq!(t.position, Position::new(0, 0));
    }

    #[test]
    fn edge_moves_are_rejected_in_place() {
        let mut env = MazeEnv::new(&open_config(3, 3)).unwrap();
        let t = env.step(Action::Up.index()).unwrap();
        assert_eq!(t.position, Position::new(0, 0));
        assert_eq!(t.previous, Position::new(0, 0));
        assert!(!t.done);
        assert_eq!(t.reward, STEP_COST);
    }

    #[test]
    fn movement_soundness_over_random_walks() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let config = MazeConfig {
            rows: 5,
            cols: 5,
            walls: 12,
            start: Position::new(2, 2),
            goal: Position::new(4, 4),
            trap: Some(Position::new(0, 4)),
            seed: Some(7),
        };
        let mut env = MazeEnv::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut pos = env.reset();
        for _ in 0..500 {
            let t = env.step(rng.random_range(0..Action::COUNT)).unwrap();
            assert!(env.grid().contains(t.position));
            let dr = t.position.row.abs_diff(pos.row);
            let dc = t.position.col.abs_diff(pos.col);
            assert!(dr + dc <= 1, "step moved more than one cell");
            if t.done {
                pos = env.reset();
            } else {
                pos = t.position;
            }
        }
    }

    #[test]
    fn goal_and_trap_rewards() {
        let config = MazeConfig {
            rows: 2,
            cols: 3,
            walls: 0,
            start: Position::new(0, 0),
            goal: Position::new(0, 1),
            trap: Some(Position::new(1, 0)),
            seed: None,
        };

        let mut env = MazeEnv::new(&config).unwrap();
        let t = env.step(Action::Right.index()).unwrap();
        assert_eq!(t.reward, GOAL_REWARD);
        assert!(t.done);

        env.reset();
        let t = env.step(Action::Down.index()).unwrap();
        assert_eq!(t.reward, TRAP_REWARD);
        assert!(t.done);
    }

    #[test]
    fn rejected_move_still_reevaluates_current_cell() {
        // Start adjacent to the goal, step onto it, then bounce against the
        // top edge: the rejected move must still report the terminal reward.
        let config = MazeConfig {
            rows: 2,
            cols: 2,
            walls: 0,
            start: Position::new(0, 0),
            goal: Position::new(0, 1),
            trap: None,
            seed: None,
        };
        let mut env = MazeEnv::new(&config).unwrap();
        env.step(Action::Right.index()).unwrap();
        let t = env.step(Action::Up.index()).unwrap();
        assert_eq!(t.position, Position::new(0, 1));
        assert_eq!(t.reward, GOAL_REWARD);
        assert!(t.done);
    }

    #[test]
    fn tracks_previous_and_current_position() {
        let mut env = MazeEnv::new(&open_config(3, 3)).unwrap();
        env.step(Action::Down.index()).unwrap();
        env.step(Action::Right.index()).unwrap();
        assert_eq!(env.previous_position(), Position::new(1, 0));
        assert_eq!(env.position(), Position::new(1, 1));
    }

    #[test]
    fn reset_returns_to_start() {
        let mut env = MazeEnv::new(&open_config(3, 3)).unwrap();
        env.step(Action::Down.index()).unwrap();
        assert_eq!(env.reset(), Position::new(0, 0));
        assert_eq!(env.previous_position(), Position::new(0, 0));
    }
}
