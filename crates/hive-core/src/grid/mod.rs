//! Hex cell storage, adjacency and empty-cell sampling.

use crate::creature::CreatureId;
use crate::layout::HexLayout;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod empty;
mod terrain;

use empty::EmptyCells;

/// Row ordering/lookup coordinate. Layout-built grids use the row's centre y
/// in thousandths of a pixel; hand-built grids may use anything unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub i64);

impl RowKey {
    pub fn from_center_y(y: f64) -> Self {
        Self((y * 1000.0).round() as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub column: usize,
    pub row: RowKey,
}

impl Position {
    pub fn new(column: usize, row: RowKey) -> Self {
        Self { column, row }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Food,
    Toxin,
    Occupied(CreatureId),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn creature(self) -> Option<CreatureId> {
        match self {
            Cell::Occupied(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left = 0,
    Right = 1,
    UpLeft = 2,
    UpRight = 3,
    DownLeft = 4,
    DownRight = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }

    /// `(row delta, column delta)` from a row of the given parity.
    fn offset(self, even_row: bool) -> (i64, i64) {
        let diag_left = if even_row { -1 } else { 0 };
        let diag_right = diag_left + 1;
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, diag_left),
            Direction::UpRight => (-1, diag_right),
            Direction::DownLeft => (1, diag_left),
            Direction::DownRight => (1, diag_right),
        }
    }
}

#[derive(Clone, Debug)]
struct Row {
    key: RowKey,
    cells: Vec<Cell>,
}

#[derive(Clone, Debug, Default)]
pub struct HexGrid {
    rows: Vec<Row>,
    row_index: HashMap<RowKey, usize>,
    empty: EmptyCells,
}

impl HexGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layout(layout: &HexLayout) -> Self {
        let mut grid = Self::new();
        for r in 0..layout.row_count() {
            grid.add_row(
                RowKey::from_center_y(layout.center_y(r)),
                layout.columns_in_row(r),
            );
        }
        grid
    }

    /// Rectangular grid keyed `0..rows`, for tools and tests.
    pub fn rectangular(columns: usize, rows: usize) -> Self {
        let mut grid = Self::new();
        for r in 0..rows {
            grid.add_row(RowKey(r as i64), columns);
        }
        grid
    }

    /// Append an all-empty row. Returns `false` if the key already exists.
    pub fn add_row(&mut self, key: RowKey, len: usize) -> bool {
        if self.row_index.contains_key(&key) {
            return false;
        }
        self.row_index.insert(key, self.rows.len());
        self.rows.push(Row {
            key,
            cells: vec![Cell::Empty; len],
        });
        for column in 0..len {
            self.empty.insert(Position::new(column, key));
        }
        true
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_index(&self, key: RowKey) -> Option<usize> {
        self.row_index.get(&key).copied()
    }

    pub fn row_key(&self, index: usize) -> Option<RowKey> {
        self.rows.get(index).map(|r| r.key)
    }

    pub fn row_len(&self, key: RowKey) -> Option<usize> {
        self.row_index(key).map(|i| self.rows[i].cells.len())
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        let row = self.row_index(pos.row)?;
        self.rows[row].cells.get(pos.column).copied()
    }

    /// Write a cell and keep the empty-cell cache in step. Returns the
    /// previous content, or `None` if the position does not exist.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Option<Cell> {
        let row = self.row_index(pos.row)?;
        let slot = self.rows[row].cells.get_mut(pos.column)?;
        let previous = std::mem::replace(slot, cell);
        if cell.is_empty() {
            self.empty.insert(pos);
        } else {
            self.empty.remove(pos);
        }
        Some(previous)
    }

    /// Neighbour positions in direction order; `None` where the row or
    /// column does not exist.
    pub fn neighbor_slots(&self, pos: Position) -> [Option<Position>; 6] {
        let mut slots = [None; 6];
        let Some(row) = self.row_index(pos.row) else {
            return slots;
        };
        if pos.column >= self.rows[row].cells.len() {
            return slots;
        }
        let even = row % 2 == 0;
        for dir in Direction::ALL {
            let (dr, dc) = dir.offset(even);
            let r = row as i64 + dr;
            let c = pos.column as i64 + dc;
            if r < 0 || c < 0 {
                continue;
            }
            let Some(target) = self.rows.get(r as usize) else {
                continue;
            };
            if (c as usize) < target.cells.len() {
                slots[dir.index()] = Some(Position::new(c as usize, target.key));
            }
        }
        slots
    }

    pub fn neighbors_of(&self, pos: Position) -> Vec<(Direction, Position)> {
        self.neighbor_slots(pos)
            .into_iter()
            .zip(Direction::ALL)
            .filter_map(|(slot, dir)| slot.map(|p| (dir, p)))
            .collect()
    }

    /// Hex distance via odd-row offset → cube coordinates.
    pub fn distance(&self, a: Position, b: Position) -> Option<u32> {
        let cube = |p: Position| -> Option<(i64, i64, i64)> {
            let r = self.row_index(p.row)? as i64;
            let x = p.column as i64 - (r - (r & 1)) / 2;
            let z = r;
            Some((x, -x - z, z))
        };
        let (ax, ay, az) = cube(a)?;
        let (bx, by, bz) = cube(b)?;
        let d = (ax - bx).abs().max((ay - by).abs()).max((az - bz).abs());
        Some(d as u32)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.rows.iter().flat_map(|row| {
            (0..row.cells.len()).map(move |column| Position::new(column, row.key))
        })
    }

    /// `(position, cell)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .enumerate()
                .map(move |(column, &cell)| (Position::new(column, row.key), cell))
        })
    }

    pub fn empty_count(&self) -> usize {
        self.empty.len()
    }

    fn rebuild_empty_cache(&mut self) {
        self.empty.clear();
        for row in &self.rows {
            for (column, cell) in row.cells.iter().enumerate() {
                if cell.is_empty() {
                    self.empty.insert(Position::new(column, row.key));
                }
            }
        }
    }

    /// Pick a random empty cell: cache picks first (evicting stale entries),
    /// then random probes over the grid, then a full scan.
    pub fn sample_empty_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        for _ in 0..crate::constants::EMPTY_SAMPLE_ATTEMPTS {
            if self.empty.len() == 0 {
                break;
            }
            let Some(pos) = self.empty.get(rng.random_range(0..self.empty.len())) else {
                break;
            };
            if self.get(pos).is_some_and(Cell::is_empty) {
                return Some(pos);
            }
            self.empty.remove(pos);
        }

        if self.rows.is_empty() {
            return None;
        }
        for _ in 0..crate::constants::RANDOM_PROBE_ATTEMPTS {
            let row = &self.rows[rng.random_range(0..self.rows.len())];
            if row.cells.is_empty() {
                continue;
            }
            let column = rng.random_range(0..row.cells.len());
            if row.cells[column].is_empty() {
                let pos = Position::new(column, row.key);
                self.empty.insert(pos);
                return Some(pos);
            }
        }

        let found = self.cells().find(|(_, cell)| cell.is_empty()).map(|(p, _)| p);
        if let Some(pos) = found {
            self.empty.insert(pos);
        }
        found
    }
}
