//! Tile grid and layout generation
//!
//! The grid is indexed by (row, col), 0-based from the top-left corner.
//! Only the Destructible -> Empty transition is allowed after creation.

use std::fmt;

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;

/// Static contents of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    /// Indestructible wall, blocks movement and blasts
    Solid,
    /// Block that absorbs one blast and turns Empty
    Destructible,
}

/// Result of probing a cell that may lie outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Solid,
    Destructible,
    OutOfBounds,
}

impl From<Tile> for CellState {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Empty => CellState::Empty,
            Tile::Solid => CellState::Solid,
            Tile::Destructible => CellState::Destructible,
        }
    }
}

/// Grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub col: u32,
}

impl CellPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Cell as a vector (x = col, y = row)
    #[inline]
    pub fn as_ivec2(self) -> IVec2 {
        IVec2::new(self.col as i32, self.row as i32)
    }

    /// Cell reached by walking `steps` cells in `dir`, if it has non-negative coordinates
    pub fn offset(self, dir: Direction, steps: u32) -> Option<CellPos> {
        let target = self.as_ivec2() + dir.delta() * steps as i32;
        let col = u32::try_from(target.x).ok()?;
        let row = u32::try_from(target.y).ok()?;
        Some(CellPos::new(row, col))
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four axis directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Blast propagation order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step (x = col, y = row)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Direction for a unit delta along one axis
    pub fn from_delta(delta: IVec2) -> Option<Self> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Fixed-size rectangular tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    cols: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Grid with the fixed wall structure (border and even/even pillars), everything else Empty
    pub fn walled(rows: u32, cols: u32) -> Self {
        let mut tiles = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let tile = if is_structural(row, col, rows, cols) {
                    Tile::Solid
                } else {
                    Tile::Empty
                };
                tiles.push(tile);
            }
        }
        Self { rows, cols, tiles }
    }

    /// Parse a grid from text rows: `#` Solid, `+` Destructible, anything else Empty.
    ///
    /// Returns `None` for an empty or ragged layout. No wall structure is enforced,
    /// which makes this handy for hand-built levels and tests.
    pub fn from_ascii(lines: &[&str]) -> Option<Self> {
        let cols = lines.first()?.chars().count();
        if cols == 0 {
            return None;
        }
        let mut tiles = Vec::with_capacity(cols * lines.len());
        for line in lines {
            if line.chars().count() != cols {
                return None;
            }
            tiles.extend(line.chars().map(|c| match c {
                '#' => Tile::Solid,
                '+' => Tile::Destructible,
                _ => Tile::Empty,
            }));
        }
        Some(Self {
            rows: u32::try_from(lines.len()).ok()?,
            cols: u32::try_from(cols).ok()?,
            tiles,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn is_in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && row < i64::from(self.rows) && col < i64::from(self.cols)
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Probe a cell; anything outside the grid reports `OutOfBounds`
    pub fn cell_state(&self, row: i64, col: i64) -> CellState {
        if !self.is_in_bounds(row, col) {
            return CellState::OutOfBounds;
        }
        self.tiles[self.index(row as u32, col as u32)].into()
    }

    pub fn tile(&self, pos: CellPos) -> Option<Tile> {
        self.contains(pos)
            .then(|| self.tiles[self.index(pos.row, pos.col)])
    }

    pub fn is_empty(&self, pos: CellPos) -> bool {
        self.tile(pos) == Some(Tile::Empty)
    }

    /// Clear a destructible block. Returns true if the tile changed.
    pub fn set_empty(&mut self, pos: CellPos) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let index = self.index(pos.row, pos.col);
        if self.tiles[index] == Tile::Destructible {
            self.tiles[index] = Tile::Empty;
            true
        } else {
            false
        }
    }

    /// Neighbouring cell `steps` away, if inside the grid
    pub fn step(&self, pos: CellPos, dir: Direction, steps: u32) -> Option<CellPos> {
        pos.offset(dir, steps).filter(|p| self.contains(*p))
    }

    /// Player start: the top-left walkable corner
    pub fn player_spawn(&self) -> CellPos {
        CellPos::new(1, 1)
    }

    /// Monster spawn: the bottom-right walkable corner
    pub fn monster_spawn(&self) -> CellPos {
        CellPos::new(self.rows.saturating_sub(2), self.cols.saturating_sub(2))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    fn set(&mut self, pos: CellPos, tile: Tile) {
        if self.contains(pos) {
            let index = self.index(pos.row, pos.col);
            self.tiles[index] = tile;
        }
    }
}

/// Border and checkerboard pillars
fn is_structural(row: u32, col: u32, rows: u32, cols: u32) -> bool {
    row == 0 || col == 0 || row + 1 == rows || col + 1 == cols || (row % 2 == 0 && col % 2 == 0)
}

/// Strategy that produces the starting grid of an episode
pub trait LayoutPolicy: fmt::Debug {
    fn generate(&self, rows: u32, cols: u32, rng: &mut SimRng) -> Grid;
}

/// Border and pillars are Solid, reserved cells are Empty, the rest is
/// Destructible with a fixed probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicLayout {
    destructible_chance: f64,
    reserved: Vec<CellPos>,
}

impl ClassicLayout {
    pub fn new(destructible_chance: f64, reserved: Vec<CellPos>) -> Self {
        Self {
            destructible_chance: destructible_chance.clamp(0.0, 1.0),
            reserved,
        }
    }

    /// Reserve the L-shaped start zone and the monster spawn cell
    pub fn with_spawn_zones(destructible_chance: f64, rows: u32, cols: u32) -> Self {
        let monster = Grid::walled(rows, cols).monster_spawn();
        Self::new(
            destructible_chance,
            vec![
                CellPos::new(1, 1),
                CellPos::new(1, 2),
                CellPos::new(2, 1),
                monster,
            ],
        )
    }

    pub fn destructible_chance(&self) -> f64 {
        self.destructible_chance
    }
}

impl LayoutPolicy for ClassicLayout {
    fn generate(&self, rows: u32, cols: u32, rng: &mut SimRng) -> Grid {
        let mut grid = Grid::walled(rows, cols);
        if self.destructible_chance <= 0.0 {
            return grid;
        }
        for row in 0..rows {
            for col in 0..cols {
                let pos = CellPos::new(row, col);
                if is_structural(row, col, rows, cols) || self.reserved.contains(&pos) {
                    continue;
                }
                if rng.random_bool(self.destructible_chance) {
                    grid.set(pos, Tile::Destructible);
                }
            }
        }
        grid
    }
}

/// A hand-built grid reused as-is for every episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLayout(pub Grid);

impl LayoutPolicy for FixedLayout {
    fn generate(&self, _rows: u32, _cols: u32, _rng: &mut SimRng) -> Grid {
        self.0.clone()
    }
}
