//! Grid topology: cells, wall flags, and random wall generation
//!
//! A maze is a fixed R×C grid of cells. Each cell carries a marker (free,
//! goal, or trap) and four independent wall flags. Walls are always placed in
//! mirrored pairs: a wall on one cell's side implies the matching wall on the
//! neighbor across that side. The movement resolver relies on this invariant
//! and only ever consults the departure cell's flags.

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::maze::env::Action;

/// Grid coordinate, 0-indexed (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbor in the given direction, or `None` if it would leave the
    /// non-negative coordinate space. Grid bounds are checked separately.
    pub fn neighbor(&self, action: Action) -> Option<Position> {
        let (dr, dc) = action.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position { row, col })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cell marker. Wire values follow the original grid encoding
/// (0 = free, 2 = goal, -2 = trap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Free,
    Goal,
    Trap,
}

impl CellKind {
    /// Scalar marker value
    pub fn marker(&self) -> i8 {
        match self {
            CellKind::Free => 0,
            CellKind::Goal => 2,
            CellKind::Trap => -2,
        }
    }

    /// Whether occupying a cell with this marker ends the episode
    pub fn is_terminal(&self) -> bool {
        matches!(self, CellKind::Goal | CellKind::Trap)
    }
}

/// A single maze cell: marker plus four wall flags indexed by direction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    walls: [bool; 4],
}

impl Cell {
    pub fn has_wall(&self, side: Action) -> bool {
        self.walls[side.index()]
    }

    fn set_wall(&mut self, side: Action) {
        self.walls[side.index()] = true;
    }
}

/// Fixed-size grid of cells. Topology is frozen after generation; markers are
/// placed once during environment setup and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with all cells free and all wall flags cleared
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.row * self.cols + pos.col]
    }

    fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[pos.row * self.cols + pos.col]
    }

    pub(crate) fn set_marker(&mut self, pos: Position, kind: CellKind) {
        self.cell_mut(pos).kind = kind;
    }

    /// Apply `count` random wall placements.
    ///
    /// Placements are independent draws with replacement: a draw that lands on
    /// an already-walled boundary is a no-op overwrite, so the number of
    /// distinct wall segments may be less than `count`. Callers must not
    /// assume exactly `count` unique walls.
    pub fn generate_walls(&mut self, count: usize, rng: &mut StdRng) {
        for _ in 0..count {
            self.place_random_wall(rng);
        }
    }

    /// Pick an orientation uniformly, then a cell whose neighbor on that side
    /// is guaranteed in-bounds, and set both mirrored flags.
    fn place_random_wall(&mut self, rng: &mut StdRng) {
        let side = Action::ALL[rng.random_range(0..4)];
        let pos = match side {
            Action::Up => Position::new(rng.random_range(1..self.rows), rng.random_range(0..self.cols)),
            Action::Down => {
                Position::new(rng.random_range(0..self.rows - 1), rng.random_range(0..self.cols))
            }
            Action::Left => Position::new(rng.random_range(0..self.rows), rng.random_range(1..self.cols)),
            Action::Right => {
                Position::new(rng.random_range(0..self.rows), rng.random_range(0..self.cols - 1))
            }
        };
        let neighbor = pos
            .neighbor(side)
            .expect("wall placement draws keep the neighbor in-bounds");

        self.cell_mut(pos).set_wall(side);
        self.cell_mut(neighbor).set_wall(side.opposite());
    }

    /// Count distinct wall segments (each mirrored pair counted once)
    pub fn wall_segments(&self) -> usize {
        let mut segments = 0;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = self.cell(Position::new(row, col));
                // Count each boundary from the cell on its up/left side only
                if cell.has_wall(Action::Down) {
                    segments += 1;
                }
                if cell.has_wall(Action::Right) {
                    segments += 1;
                }
            }
        }
        segments
    }
}
