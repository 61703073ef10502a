//! Maze state machine: grid topology, wall-aware movement, reward policy
//!
//! The grid and its wall layout are generated once per environment and frozen;
//! the environment then resolves discrete actions against that topology and
//! derives rewards and termination from cell markers.

pub mod env;
pub mod grid;

pub use env::{Action, MazeConfig, MazeEnv, Transition, GOAL_REWARD, STEP_COST, TRAP_REWARD};
pub use grid::{Cell, CellKind, Grid, Position};
