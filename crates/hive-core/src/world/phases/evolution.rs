use super::super::World;
use crate::constants::{BRAIN_HIDDEN, BRAIN_INPUTS, BRAIN_OUTPUTS, ELITE_MUTATION_ROUNDS};
use crate::goal::GoalNet;
use crate::nn::FeedforwardNet;
use rand::Rng;
use tracing::debug;

impl World {
    /// On spawn ticks, maybe place a heavily mutated copy of the champion
    /// (or a fresh random mother when there is none) on a random empty cell.
    pub(in crate::world) fn step_evolution_phase(&mut self) -> bool {
        if !self.tick.is_multiple_of(self.config.evolution_spawn_interval) {
            return false;
        }
        if !self.rng.random_bool(self.config.evolution_spawn_probability) {
            return false;
        }
        let Some(pos) = self.grid.sample_empty_cell(&mut self.rng) else {
            return false;
        };

        let (mut brain, mut goal_net) = match &self.champion {
            Some(champion) => (champion.brain.clone(), champion.goal_net.clone()),
            None => (
                FeedforwardNet::new(BRAIN_INPUTS, &BRAIN_HIDDEN, BRAIN_OUTPUTS, &mut self.rng),
                GoalNet::new(&mut self.rng),
            ),
        };
        let (rate, strength) = (
            self.config.elite_mutation_rate,
            self.config.elite_mutation_strength,
        );
        for _ in 0..ELITE_MUTATION_ROUNDS {
            brain.mutate(&mut self.rng, rate, strength);
            goal_net.mutate(&mut self.rng, rate, strength);
        }
        let from_champion = self.champion.is_some();
        let id = self.spawn_root(pos, Some((brain, goal_net)));
        debug!(tick = self.tick, ?id, from_champion, "elite spawned");
        true
    }
}
