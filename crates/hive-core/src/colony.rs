//! Creature arena, shared point pools and colony bookkeeping.
//!
//! Creatures live in a slotmap arena and are addressed by [`CreatureId`]. The
//! live list fixes processing order. A mother removed while she still has
//! offspring is *retired*: she leaves the live list but stays in the arena so
//! her offspring's `mother` ids keep resolving until the last one is gone.

use crate::color::Rgb;
use crate::constants::EATABLE_HUNGER_FRACTION;
use crate::creature::{Creature, CreatureId, PointsHandle};
use slotmap::SlotMap;

/// A colony whose root left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dissolution {
    pub root: CreatureId,
    /// Colour to hand back to the registry; `None` when the root holds no
    /// reservation (orphans, fallback colours, already dissolved).
    pub released_color: Option<Rgb>,
    pub orphaned: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub removed: usize,
    pub dissolutions: Vec<Dissolution>,
}

#[derive(Clone, Copy)]
enum Pool {
    Own(CreatureId),
    Root(CreatureId),
    Private(CreatureId),
}

#[derive(Clone, Debug)]
pub struct Population {
    arena: SlotMap<CreatureId, Creature>,
    live: Vec<CreatureId>,
    max_hunger: u32,
}

impl Population {
    pub fn new(max_hunger: u32) -> Self {
        Self {
            arena: SlotMap::with_key(),
            live: Vec::new(),
            max_hunger,
        }
    }

    pub fn max_hunger(&self) -> u32 {
        self.max_hunger
    }

    /// Add a creature to the end of the live list. An offspring is also
    /// appended to its root's offspring list.
    pub fn insert(&mut self, creature: Creature) -> CreatureId {
        let root = creature.mother;
        let id = self.arena.insert(creature);
        self.live.push(id);
        if let Some(root) = root {
            self.creature_mut(root).offspring.push(id);
        }
        id
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.arena.get_mut(id)
    }

    /// Arena lookup for ids the simulation itself handed out.
    ///
    /// # Panics
    /// If the id is stale, which means a grid cell or colony link outlived
    /// its creature.
    pub fn creature(&self, id: CreatureId) -> &Creature {
        self.arena
            .get(id)
            .unwrap_or_else(|| panic!("creature {id:?} referenced but not in the arena"))
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> &mut Creature {
        self.arena
            .get_mut(id)
            .unwrap_or_else(|| panic!("creature {id:?} referenced but not in the arena"))
    }

    /// Ids in processing order.
    pub fn live_ids(&self) -> &[CreatureId] {
        &self.live
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (CreatureId, &Creature)> + '_ {
        self.live.iter().map(|&id| (id, self.creature(id)))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live-list creatures plus retired mothers.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_retired(&self, id: CreatureId) -> bool {
        self.arena.contains_key(id) && !self.live.contains(&id)
    }

    pub fn colony_root(&self, id: CreatureId) -> CreatureId {
        self.creature(id).mother.unwrap_or(id)
    }

    pub fn same_colony(&self, a: CreatureId, b: CreatureId) -> bool {
        self.colony_root(a) == self.colony_root(b)
    }

    /// The creature's mother, if it still exists and is alive.
    pub fn living_mother(&self, id: CreatureId) -> Option<CreatureId> {
        let mother = self.creature(id).mother?;
        self.arena
            .get(mother)
            .filter(|m| m.is_alive())
            .map(|_| mother)
    }

    fn pool(&self, id: CreatureId) -> Pool {
        match self.creature(id).points {
            PointsHandle::Owned(_) => Pool::Own(id),
            PointsHandle::DelegatedTo { root, .. } => match self.arena.get(root) {
                Some(r) if r.is_alive() => {
                    assert!(
                        matches!(r.points, PointsHandle::Owned(_)),
                        "colony root {root:?} does not own a point pool"
                    );
                    Pool::Root(root)
                }
                _ => Pool::Private(id),
            },
        }
    }

    /// Points as seen by `id`: the colony pool while the root is alive,
    /// otherwise the creature's own.
    pub fn points(&self, id: CreatureId) -> u32 {
        match self.pool(id) {
            Pool::Own(owner) | Pool::Root(owner) | Pool::Private(owner) => {
                self.creature(owner).points.private()
            }
        }
    }

    pub fn set_points(&mut self, id: CreatureId, value: u32) {
        match self.pool(id) {
            Pool::Own(owner) | Pool::Root(owner) => {
                self.creature_mut(owner).points = PointsHandle::Owned(value);
            }
            Pool::Private(owner) => {
                if let PointsHandle::DelegatedTo { private, .. } =
                    &mut self.creature_mut(owner).points
                {
                    *private = value;
                }
            }
        }
    }

    pub fn add_points(&mut self, id: CreatureId, amount: u32) {
        let p = self.points(id);
        self.set_points(id, p.saturating_add(amount));
    }

    pub fn sub_points(&mut self, id: CreatureId, amount: u32) {
        let p = self.points(id);
        self.set_points(id, p.saturating_sub(amount));
    }

    /// `eater` may eat `target`: a different, living colony member starving
    /// past the prey threshold.
    pub fn is_eatable_by(&self, eater: CreatureId, target: CreatureId) -> bool {
        if eater == target {
            return false;
        }
        let t = self.creature(target);
        t.is_alive()
            && !self.same_colony(eater, target)
            && t.hunger as f32 >= EATABLE_HUNGER_FRACTION * self.max_hunger as f32
    }

    /// `neighbor` is alive and could eat `me`.
    pub fn threatens(&self, neighbor: CreatureId, me: CreatureId) -> bool {
        self.creature(neighbor).is_alive() && self.is_eatable_by(neighbor, me)
    }

    /// Living offspring count and their mean hunger.
    pub fn offspring_stats(&self, mother: CreatureId) -> (usize, f32) {
        let (count, total) = self
            .creature(mother)
            .offspring
            .iter()
            .filter_map(|&o| self.arena.get(o))
            .filter(|o| o.is_alive())
            .fold((0usize, 0u64), |(n, sum), o| (n + 1, sum + o.hunger as u64));
        let avg = if count > 0 {
            total as f32 / count as f32
        } else {
            0.0
        };
        (count, avg)
    }

    pub fn living_mothers(&self) -> usize {
        self.iter_live()
            .filter(|(_, c)| c.is_alive() && c.is_mother())
            .count()
    }

    /// Drop every dead and captured creature from the live list and settle
    /// colony links.
    pub fn prune(&mut self) -> PruneOutcome {
        let (gone, kept): (Vec<CreatureId>, Vec<CreatureId>) =
            self.live.iter().copied().partition(|&id| {
                let c = self.creature(id);
                c.dead && c.captured
            });
        self.live = kept;

        let mut outcome = PruneOutcome {
            removed: gone.len(),
            dissolutions: Vec::new(),
        };
        for id in gone {
            let (mother, has_offspring) = {
                let c = self.creature(id);
                (c.mother, !c.offspring.is_empty())
            };
            if let Some(mother) = mother {
                self.arena.remove(id);
                let emptied = {
                    let m = self.creature_mut(mother);
                    m.offspring.retain(|&o| o != id);
                    m.offspring.is_empty()
                };
                if emptied {
                    outcome.dissolutions.push(self.dissolve(mother));
                    if !self.live.contains(&mother) {
                        self.arena.remove(mother);
                    }
                }
            } else if !has_offspring {
                outcome.dissolutions.push(self.dissolve(id));
                self.arena.remove(id);
            }
        }
        outcome
    }

    /// Orphan whatever offspring remain and hand back the root's colour
    /// reservation, if it still holds one.
    fn dissolve(&mut self, root: CreatureId) -> Dissolution {
        let offspring = std::mem::take(&mut self.creature_mut(root).offspring);
        let mut orphaned = 0;
        for o in offspring {
            if let Some(child) = self.arena.get_mut(o) {
                child.orphan();
                orphaned += 1;
            }
        }
        let r = self.creature_mut(root);
        let released_color = r.color_reserved.then_some(r.color);
        r.color_reserved = false;
        Dissolution {
            root,
            released_color,
            orphaned,
        }
    }
}
