use super::super::World;
use crate::grid::Cell;
use rand::Rng;

impl World {
    /// On toxin ticks, turn each empty cell into a toxin with the configured
    /// probability. Returns the number seeded.
    pub(in crate::world) fn step_toxin_phase(&mut self) -> usize {
        if !self.tick.is_multiple_of(self.config.toxin_spawn_interval) {
            return 0;
        }
        let p = self.config.toxin_spawn_probability;
        let empties: Vec<_> = self
            .grid
            .cells()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(pos, _)| pos)
            .collect();
        let mut seeded = 0;
        for pos in empties {
            if self.rng.random_bool(p) {
                self.grid.set(pos, Cell::Toxin);
                seeded += 1;
            }
        }
        seeded
    }
}
