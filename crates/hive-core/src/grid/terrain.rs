use super::{Cell, HexGrid, Position};
use crate::constants::{FOOD_SEED_PROBABILITY, WALL_BIRTH_MIN, WALL_SURVIVAL_MIN};
use rand::Rng;

impl HexGrid {
    /// Cellular-automaton cave generation followed by food scattering.
    ///
    /// Occupied cells are never rewritten and count as non-wall neighbours.
    pub fn generate_terrain<R: Rng + ?Sized>(
        &mut self,
        wall_probability: f64,
        iterations: usize,
        rng: &mut R,
    ) {
        let p = wall_probability.clamp(0.0, 1.0);
        for row in &mut self.rows {
            for cell in &mut row.cells {
                if matches!(cell, Cell::Occupied(_)) {
                    continue;
                }
                *cell = if rng.random_bool(p) {
                    Cell::Wall
                } else {
                    Cell::Empty
                };
            }
        }

        for _ in 0..iterations {
            self.automaton_pass();
        }

        for row in &mut self.rows {
            for cell in &mut row.cells {
                if cell.is_empty() && rng.random_bool(FOOD_SEED_PROBABILITY) {
                    *cell = Cell::Food;
                }
            }
        }

        self.rebuild_empty_cache();
    }

    /// One synchronous pass: sparse walls erode, enclosed holes fill.
    fn automaton_pass(&mut self) {
        let next: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .enumerate()
                    .map(|(column, &cell)| {
                        let walls = self.wall_neighbors(Position::new(column, row.key));
                        match cell {
                            Cell::Wall if walls < WALL_SURVIVAL_MIN => Cell::Empty,
                            Cell::Empty if walls >= WALL_BIRTH_MIN => Cell::Wall,
                            other => other,
                        }
                    })
                    .collect()
            })
            .collect();
        for (row, cells) in self.rows.iter_mut().zip(next) {
            row.cells = cells;
        }
    }

    fn wall_neighbors(&self, pos: Position) -> usize {
        self.neighbor_slots(pos)
            .into_iter()
            .flatten()
            .filter(|&n| self.get(n) == Some(Cell::Wall))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RowKey;
    use crate::rng::create_rng;

    #[test]
    fn full_wall_probability_without_iterations_is_all_wall() {
        let mut grid = HexGrid::rectangular(12, 9);
        let mut rng = create_rng(5);
        grid.generate_terrain(1.0, 0, &mut rng);
        assert!(grid.cells().all(|(_, c)| c == Cell::Wall));
        assert_eq!(grid.empty_count(), 0);
    }

    #[test]
    fn zero_wall_probability_leaves_only_empty_and_food() {
        let mut grid = HexGrid::rectangular(40, 30);
        let mut rng = create_rng(6);
        grid.generate_terrain(0.0, 3, &mut rng);
        let food = grid.cells().filter(|(_, c)| *c == Cell::Food).count();
        let empty = grid.cells().filter(|(_, c)| c.is_empty()).count();
        assert_eq!(food + empty, 1200);
        // ~10% food
        assert!((60..=180).contains(&food), "food count {food}");
        assert_eq!(grid.empty_count(), empty);
    }

    #[test]
    fn isolated_wall_erodes_and_enclosed_hole_fills() {
        let mut grid = HexGrid::rectangular(7, 7);
        // Single wall in open space.
        grid.set(Position::new(1, RowKey(1)), Cell::Wall);
        let mut walls = grid.clone();
        let all: Vec<_> = walls.positions().collect();
        for pos in all {
            walls.set(pos, Cell::Wall);
        }
        walls.set(Position::new(3, RowKey(3)), Cell::Empty);

        grid.automaton_pass();
        assert!(grid.cells().all(|(_, c)| c.is_empty()));

        walls.automaton_pass();
        assert_eq!(walls.get(Position::new(3, RowKey(3))), Some(Cell::Wall));
        // Corners see only two or three neighbours and erode.
        assert_eq!(walls.get(Position::new(0, RowKey(0))), Some(Cell::Empty));
    }

    #[test]
    fn occupied_cells_survive_generation() {
        let mut grid = HexGrid::rectangular(5, 5);
        let mut arena = slotmap::SlotMap::<crate::creature::CreatureId, ()>::with_key();
        let id = arena.insert(());
        let pos = Position::new(2, RowKey(2));
        grid.set(pos, Cell::Occupied(id));
        let mut rng = create_rng(7);
        grid.generate_terrain(0.6, 4, &mut rng);
        assert_eq!(grid.get(pos), Some(Cell::Occupied(id)));
        assert!(!grid.cells().any(|(p, c)| p != pos && matches!(c, Cell::Occupied(_))));
    }
}
