use super::super::World;
use crate::colony::PruneOutcome;
use tracing::debug;

impl World {
    /// Remove dead and captured creatures, dissolving colonies whose root is
    /// gone and returning their colours to the registry.
    pub(in crate::world) fn step_prune_phase(&mut self) -> PruneOutcome {
        let outcome = self.population.prune();
        for dissolution in &outcome.dissolutions {
            if let Some(color) = dissolution.released_color {
                self.colors.release(color);
            }
            debug!(
                tick = self.tick,
                root = ?dissolution.root,
                orphaned = dissolution.orphaned,
                "colony dissolved"
            );
        }
        outcome
    }
}
