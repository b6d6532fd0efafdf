use super::super::World;
use crate::creature::{Creature, CreatureId};
use crate::grid::Cell;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

impl World {
    /// Roll once for every living creature, then place a mutated child next
    /// to each parent that passed. Returns the number of births.
    pub(in crate::world) fn step_reproduction_phase(&mut self) -> usize {
        let parents = self.roll_parents();
        let mut births = 0;
        for parent in parents {
            if self.spawn_child(parent).is_some() {
                births += 1;
            }
        }
        births
    }

    /// One Bernoulli draw per creature; survivors of the draw must also be
    /// fed enough. The cost is paid here whether or not a cell is free.
    fn roll_parents(&mut self) -> Vec<CreatureId> {
        let p = self.config.reproduction_probability;
        let (threshold, cost, max) = (
            self.config.reproduction_threshold,
            self.config.reproduction_cost,
            self.config.max_hunger,
        );
        let mut parents = Vec::new();
        for id in self.population.live_ids().to_vec() {
            if self.population.creature(id).dead {
                continue;
            }
            if !self.rng.random_bool(p) {
                continue;
            }
            let creature = self.population.creature_mut(id);
            if creature.hunger <= threshold {
                creature.add_hunger(cost, max);
                parents.push(id);
            }
        }
        parents
    }

    fn spawn_child(&mut self, parent: CreatureId) -> Option<CreatureId> {
        let here = self.population.creature(parent).position;
        let mut neighbors: Vec<_> = self
            .grid
            .neighbors_of(here)
            .into_iter()
            .map(|(_, pos)| pos)
            .collect();
        neighbors.shuffle(&mut self.rng);
        let pos = neighbors
            .into_iter()
            .find(|&n| self.grid.get(n) == Some(Cell::Empty))?;

        let root = self.population.colony_root(parent);
        self.reclaim_colony_color(root);
        let p = self.population.creature(parent);
        let mut brain = p.brain.clone();
        let generation = p.generation + 1;
        let color = self.population.creature(root).color;
        brain.mutate(
            &mut self.rng,
            self.config.mutation_rate,
            self.config.mutation_strength,
        );
        let mut child = Creature::offspring_of(root, pos, brain, color, generation, self.tick);
        child.remember(pos);
        let id = self.population.insert(child);
        self.grid.set(pos, Cell::Occupied(id));
        trace!(?parent, ?id, generation, "birth");
        Some(id)
    }

    /// A living mother whose colony dissolved gave her colour back. Take it
    /// again before she founds a new brood, or draw a fresh one if another
    /// colony holds it now.
    fn reclaim_colony_color(&mut self, root: CreatureId) {
        let mother = self.population.creature(root);
        if !mother.is_mother() || mother.color_reserved {
            return;
        }
        let old = mother.color;
        let color = if self.colors.claim(old) {
            old
        } else {
            match self.colors.reserve(&mut self.rng) {
                Some(color) => color,
                None => return,
            }
        };
        let mother = self.population.creature_mut(root);
        mother.color = color;
        mother.color_reserved = true;
        if color != old {
            debug!(?root, ?old, ?color, "colony recoloured");
        }
    }
}
