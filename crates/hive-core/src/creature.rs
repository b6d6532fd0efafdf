use crate::color::Rgb;
use crate::constants::HISTORY_CAPACITY;
use crate::goal::GoalNet;
use crate::grid::Position;
use crate::nn::FeedforwardNet;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::collections::VecDeque;

new_key_type! {
    /// Generational handle into the population arena.
    pub struct CreatureId;
}

/// Where a creature's points live.
///
/// Offspring delegate to their colony root while it is alive and fall back to
/// their private pool otherwise. Resolution always goes through
/// [`crate::colony::Population`], never through the handle alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointsHandle {
    Owned(u32),
    DelegatedTo { root: CreatureId, private: u32 },
}

impl PointsHandle {
    pub fn private(self) -> u32 {
        match self {
            PointsHandle::Owned(p) => p,
            PointsHandle::DelegatedTo { private, .. } => private,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Creature {
    pub position: Position,
    pub brain: FeedforwardNet,
    /// Present iff the creature was created as a colony mother.
    pub goal_net: Option<GoalNet>,
    pub mother: Option<CreatureId>,
    pub offspring: Vec<CreatureId>,
    pub hunger: u32,
    pub dead: bool,
    pub captured: bool,
    pub color: Rgb,
    pub generation: u32,
    pub born_tick: u64,
    history: VecDeque<Position>,
    pub(crate) points: PointsHandle,
    /// Set while `color` is held in the registry on this creature's behalf.
    pub(crate) color_reserved: bool,
}

impl Creature {
    /// A colony mother with its own goal net and point pool.
    pub fn mother(
        position: Position,
        brain: FeedforwardNet,
        goal_net: GoalNet,
        color: Rgb,
        born_tick: u64,
    ) -> Self {
        Self {
            position,
            brain,
            goal_net: Some(goal_net),
            mother: None,
            offspring: Vec::new(),
            hunger: 0,
            dead: false,
            captured: false,
            color,
            generation: 0,
            born_tick,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            points: PointsHandle::Owned(0),
            color_reserved: false,
        }
    }

    /// An offspring of `root`, drawing on the root's pool.
    pub fn offspring_of(
        root: CreatureId,
        position: Position,
        brain: FeedforwardNet,
        color: Rgb,
        generation: u32,
        born_tick: u64,
    ) -> Self {
        Self {
            position,
            brain,
            goal_net: None,
            mother: Some(root),
            offspring: Vec::new(),
            hunger: 0,
            dead: false,
            captured: false,
            color,
            generation,
            born_tick,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            points: PointsHandle::DelegatedTo { root, private: 0 },
            color_reserved: false,
        }
    }

    pub fn is_mother(&self) -> bool {
        self.goal_net.is_some()
    }

    pub fn holds_reserved_color(&self) -> bool {
        self.color_reserved
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn points_handle(&self) -> PointsHandle {
        self.points
    }

    /// Recent positions, most recent first.
    pub fn history(&self) -> impl Iterator<Item = Position> + '_ {
        self.history.iter().copied()
    }

    pub fn remembers(&self, pos: Position) -> bool {
        self.history.contains(&pos)
    }

    /// Move `pos` to the front of the history, dropping the oldest entry
    /// past capacity.
    pub fn remember(&mut self, pos: Position) {
        self.history.retain(|&p| p != pos);
        self.history.push_front(pos);
        self.history.truncate(HISTORY_CAPACITY);
    }

    /// Saturating hunger increase; returns `true` if hunger hit `max`.
    pub(crate) fn add_hunger(&mut self, amount: u32, max: u32) -> bool {
        self.hunger = self.hunger.saturating_add(amount).min(max);
        self.hunger >= max
    }

    pub(crate) fn relieve_hunger(&mut self, amount: u32) {
        self.hunger = self.hunger.saturating_sub(amount);
    }

    /// Drop the colony link: clear the mother and fall back to the private pool.
    pub(crate) fn orphan(&mut self) {
        self.mother = None;
        self.points = PointsHandle::Owned(self.points.private());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RowKey;
    use crate::nn::{FeedforwardNet, Layer};
    use slotmap::SlotMap;

    fn brain() -> FeedforwardNet {
        FeedforwardNet::from_layers(vec![Layer::zeros(2, 2)]).unwrap()
    }

    fn p(column: usize) -> Position {
        Position::new(column, RowKey(0))
    }

    #[test]
    fn history_is_most_recent_first_and_bounded() {
        let mut ids = SlotMap::<CreatureId, ()>::with_key();
        let root = ids.insert(());
        let mut c = Creature::offspring_of(root, p(0), brain(), Rgb(200, 200, 200), 1, 0);
        for col in 0..9 {
            c.remember(p(col));
        }
        let hist: Vec<_> = c.history().map(|pos| pos.column).collect();
        assert_eq!(hist, vec![8, 7, 6, 5, 4, 3]);

        c.remember(p(5));
        let hist: Vec<_> = c.history().map(|pos| pos.column).collect();
        assert_eq!(hist, vec![5, 8, 7, 6, 4, 3]);
        assert!(c.remembers(p(4)));
        assert!(!c.remembers(p(2)));
    }

    #[test]
    fn hunger_saturates_at_max() {
        let mut ids = SlotMap::<CreatureId, ()>::with_key();
        let root = ids.insert(());
        let mut c = Creature::offspring_of(root, p(0), brain(), Rgb(200, 200, 200), 1, 0);
        c.hunger = 498;
        assert!(!c.add_hunger(1, 500));
        assert!(c.add_hunger(100, 500));
        assert_eq!(c.hunger, 500);
        c.relieve_hunger(600);
        assert_eq!(c.hunger, 0);
    }

    #[test]
    fn orphan_keeps_private_points() {
        let mut ids = SlotMap::<CreatureId, ()>::with_key();
        let root = ids.insert(());
        let mut c = Creature::offspring_of(root, p(0), brain(), Rgb(200, 200, 200), 1, 0);
        c.points = PointsHandle::DelegatedTo { root, private: 17 };
        c.orphan();
        assert_eq!(c.mother, None);
        assert_eq!(c.points_handle(), PointsHandle::Owned(17));
        assert!(!c.is_mother());
    }
}
