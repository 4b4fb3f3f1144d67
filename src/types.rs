// Core types shared across the perception pipeline, the planner and the
// control loop. Grid coordinates are pixel-space: y grows downward, so Up
// means y - 1.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Side length of the game grid in cells.
pub const GRID: usize = 28;

/// A single cell on the game grid.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan_to(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Flat row-major index into a grid-sized slice.
    pub fn index(&self, grid: usize) -> usize {
        self.y as usize * grid + self.x as usize
    }

    /// Canonical integer key for hashing body configurations.
    pub fn key(&self, grid: usize) -> u16 {
        (self.y as usize * grid + self.x as usize) as u16
    }

    pub fn in_bounds(&self, grid: usize) -> bool {
        self.x >= 0 && self.x < grid as i32 && self.y >= 0 && self.y < grid as i32
    }

    /// The board center, the snake's spawn position.
    pub fn center(grid: usize) -> Cell {
        Cell::new(grid as i32 / 2, grid as i32 / 2)
    }
}

/// The four possible movement directions.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in the order every search and fallback
    /// iterates them.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Identifier carried by the synthetic input event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The next cell when moving in this direction (y grows downward).
    pub fn apply(&self, cell: &Cell) -> Cell {
        let (dx, dy) = self.delta();
        Cell::new(cell.x + dx, cell.y + dy)
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_perpendicular_to(&self, other: Direction) -> bool {
        let (ax, ay) = self.delta();
        let (bx, by) = other.delta();
        ax * bx + ay * by == 0
    }

    /// Direction of the unit step from `a` to `b`, if they are 4-adjacent.
    pub fn between(a: &Cell, b: &Cell) -> Option<Direction> {
        Direction::all().iter().find(|d| d.apply(a) == *b).copied()
    }
}

/// Per-cell sampling result: averaged RGBA, luma and the brightness verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetric {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub value: f32,
    pub bright: bool,
}

/// A maximal 4-connected group of bright cells.
///
/// `cells` is flood-fill traversal order and must not be relied upon beyond
/// the documented first-seen tie-breaks; `members` is the same set keyed for
/// O(1) lookup.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub cells: Vec<Cell>,
    pub members: HashSet<Cell>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.members.contains(cell)
    }
}

/// Perception output for one tick.
///
/// `body` runs head to tail; all cells are unique, consecutive cells are
/// exactly Manhattan distance 1 apart, and after reconciliation the length
/// equals the score-implied expected length.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Observation {
    pub head: Cell,
    pub tail: Cell,
    pub body: Vec<Cell>,
    pub food: Option<Cell>,
}

/// Reasons perception can fail to produce an observation for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptionFailure {
    /// No cell on the grid passed the brightness threshold.
    NoBrightCells,
    /// Clusters exist but none could be attributed to the snake.
    NoSnakeCluster,
    /// The reconstruction walk exceeded its loop guard.
    WalkLoop { steps: usize, cluster_size: usize },
    /// The walked and padded body is still shorter than the expected length.
    ShortBody { got: usize, expected: usize },
}

impl fmt::Display for PerceptionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerceptionFailure::NoBrightCells => write!(f, "no bright cells on the grid"),
            PerceptionFailure::NoSnakeCluster => {
                write!(f, "no cluster attributable to the snake")
            }
            PerceptionFailure::WalkLoop { steps, cluster_size } => write!(
                f,
                "reconstruction walk looped ({} steps over a {}-cell cluster)",
                steps, cluster_size
            ),
            PerceptionFailure::ShortBody { got, expected } => write!(
                f,
                "body too short after padding ({} of {} cells)",
                got, expected
            ),
        }
    }
}

/// Borrowed view of one rendered RGBA frame, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> FrameBuffer<'a> {
    /// RGBA at pixel coordinates, clamped into buffer bounds.
    pub fn pixel(&self, x: i32, y: i32) -> (u8, u8, u8, u8) {
        let x = x.max(0).min(self.width as i32 - 1) as usize;
        let y = y.max(0).min(self.height as i32 - 1) as usize;
        let i = (y * self.width + x) * 4;
        (self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }
}

/// Read-only view of the pre-existing game surface.
///
/// The bot only ever observes rendered pixels, the textual score and the
/// playing/game-over flags; it never touches game internals.
pub trait GameSurface {
    /// Whether the surface exists and can be read at all (startup gating).
    fn is_ready(&self) -> bool;
    /// Whether a game is currently in progress.
    fn is_playing(&self) -> bool;
    /// Whether the game-over overlay is up.
    fn is_game_over(&self) -> bool;
    /// Current score as displayed by the game.
    fn score(&self) -> Result<u32, String>;
    /// The latest rendered frame.
    fn frame(&self) -> Result<FrameBuffer<'_>, String>;
}

/// Injected capability for dispatching synthetic directional input.
pub trait ActionSink {
    fn press(&mut self, direction: Direction);
}
