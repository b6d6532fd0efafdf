use super::super::{StepError, World};
use crate::constants::{
    BRAIN_INPUTS, ENEMY_HUNGER_PENALTY, ENEMY_POINT_PENALTY, FAT_DIVISOR, FOOD_HUNGER_RELIEF,
    FOOD_PRIORITY_BONUS_SCALE, FOOD_REWARD, GOAL_SIGNALS, MOTHER_DISTANCE_NORM,
    MOTHER_FAT_SHARE_PERCENT, NEIGHBOR_SLOTS, POINTS_NORM, REVISIT_HUNGER_PENALTY,
    REVISIT_POINT_PENALTY, SLOT_FEATURES, STAY_HUNGER_PENALTY, STAY_POINT_PENALTY,
};
use crate::creature::CreatureId;
use crate::grid::{Cell, Position};
use crate::nn::ShapeError;
use crate::persistence::Champion;
use tracing::trace;

/// Content class, edibility, danger, enemy.
type SlotFeatures = [f32; SLOT_FEATURES];

const WALL_FEATURES: SlotFeatures = [1.0, 0.0, 0.0, 0.0];

impl World {
    /// Let every living creature sense, decide and move, in live-list order.
    pub(in crate::world) fn step_think_phase(&mut self) -> Result<(), StepError> {
        let order = self.population.live_ids().to_vec();
        for id in order {
            self.think(id)?;
            self.update_champion(id);
        }
        Ok(())
    }

    pub(in crate::world) fn think(&mut self, id: CreatureId) -> Result<(), StepError> {
        let creature = self.population.creature(id);
        if creature.dead {
            return Ok(());
        }
        if let Some(mother) = creature.mother {
            if self.population.get(mother).is_none_or(|m| m.dead) {
                self.population.creature_mut(id).dead = true;
                return Ok(());
            }
        }

        let shape = |source: ShapeError| StepError::Shape { id, source };
        let goals = self.mother_goals(id).map_err(shape)?;
        let inputs = self.sense(id, goals.unwrap_or([0.0; GOAL_SIGNALS]));
        let preferred = self
            .population
            .creature(id)
            .brain
            .decide(&inputs)
            .map_err(shape)?;

        let here = self.population.creature(id).position;
        let valid = self
            .grid
            .neighbor_slots(here)
            .map(|slot| slot.filter(|&t| self.is_valid_move(id, t)));
        if valid.iter().all(Option::is_none) {
            self.execute_move(id, here);
            return Ok(());
        }

        // The stay action and blocked directions are penalised alike.
        let Some(target) = valid.get(preferred).copied().flatten() else {
            self.penalize(id, STAY_POINT_PENALTY, STAY_HUNGER_PENALTY);
            self.execute_move(id, here);
            return Ok(());
        };

        let bonus = goals.map_or(0, |g| {
            (FOOD_PRIORITY_BONUS_SCALE * (g[0] + 1.0) / 2.0).round() as u32
        });
        if self.population.creature(id).remembers(target) {
            self.penalize(id, REVISIT_POINT_PENALTY, REVISIT_HUNGER_PENALTY);
        }
        let content = self.grid.get(target);
        if let Some(Cell::Occupied(other)) = content {
            if self.population.creature(other).is_alive() && !self.population.same_colony(id, other)
            {
                self.penalize(id, ENEMY_POINT_PENALTY, ENEMY_HUNGER_PENALTY);
            }
        }
        if content.is_some_and(|c| self.is_capturable_by(id, c)) {
            self.population.add_points(id, FOOD_REWARD + bonus);
        }
        self.execute_move(id, target);
        Ok(())
    }

    /// Goal signals from a living mother that carries a goal net.
    fn mother_goals(&self, id: CreatureId) -> Result<Option<[f32; GOAL_SIGNALS]>, ShapeError> {
        let Some(mother_id) = self.population.living_mother(id) else {
            return Ok(None);
        };
        let mother = self.population.creature(mother_id);
        let Some(goal_net) = &mother.goal_net else {
            return Ok(None);
        };
        let (count, avg_hunger) = self.population.offspring_stats(mother_id);
        goal_net
            .get_goals(
                mother.hunger,
                self.population.points(mother_id),
                count,
                avg_hunger,
                self.config.max_hunger,
            )
            .map(Some)
    }

    pub(in crate::world) fn sense(&self, id: CreatureId, goals: [f32; GOAL_SIGNALS]) -> Vec<f32> {
        let me = self.population.creature(id);
        let mut inputs = Vec::with_capacity(BRAIN_INPUTS);
        let mut kin = 0usize;
        let mut novel = 0usize;
        for slot in self.grid.neighbor_slots(me.position) {
            let Some(pos) = slot else {
                inputs.extend_from_slice(&WALL_FEATURES);
                continue;
            };
            if !me.remembers(pos) {
                novel += 1;
            }
            let cell = self.grid.get(pos).unwrap_or(Cell::Wall);
            if let Cell::Occupied(n) = cell {
                if self.population.creature(n).is_alive() && self.population.same_colony(id, n) {
                    kin += 1;
                }
            }
            inputs.extend_from_slice(&self.slot_features(id, cell));
        }

        inputs.push(me.hunger as f32 / self.config.max_hunger as f32);
        inputs.push((self.population.points(id) as f32 / POINTS_NORM).min(1.0));
        inputs.push(kin as f32 / NEIGHBOR_SLOTS as f32);
        inputs.push(self.mother_distance(id));
        inputs.push(novel as f32 / NEIGHBOR_SLOTS as f32);
        inputs.push(if me.is_mother() { 1.0 } else { 0.0 });
        inputs.extend_from_slice(&goals);
        inputs
    }

    fn slot_features(&self, me: CreatureId, cell: Cell) -> SlotFeatures {
        match cell {
            Cell::Empty | Cell::Toxin => [0.0; SLOT_FEATURES],
            Cell::Food => [0.5, 1.0, 0.0, 0.0],
            Cell::Wall => WALL_FEATURES,
            Cell::Occupied(n) => {
                let other = self.population.creature(n);
                if other.dead {
                    let edible = if other.captured { 0.0 } else { 1.0 };
                    return [0.5, edible, 0.0, 0.0];
                }
                let prey = self.population.is_eatable_by(me, n);
                [
                    if prey { 0.5 } else { 1.0 },
                    if prey { 1.0 } else { 0.0 },
                    if self.population.threatens(n, me) { 1.0 } else { 0.0 },
                    if self.population.same_colony(me, n) { 0.0 } else { 1.0 },
                ]
            }
        }
    }

    /// `min(hex distance / 20, 1)` to a living mother, 0 without one.
    fn mother_distance(&self, id: CreatureId) -> f32 {
        let Some(mother) = self.population.living_mother(id) else {
            return 0.0;
        };
        let here = self.population.creature(id).position;
        let there = self.population.creature(mother).position;
        self.grid
            .distance(here, there)
            .map_or(0.0, |d| (d as f32 / MOTHER_DISTANCE_NORM).min(1.0))
    }

    /// Food, an uncaptured corpse, or living prey.
    fn is_capturable_by(&self, id: CreatureId, cell: Cell) -> bool {
        match cell {
            Cell::Food => true,
            Cell::Occupied(other) => {
                let c = self.population.creature(other);
                (c.dead && !c.captured) || self.population.is_eatable_by(id, other)
            }
            Cell::Empty | Cell::Wall | Cell::Toxin => false,
        }
    }

    pub(in crate::world) fn is_valid_move(&self, id: CreatureId, target: Position) -> bool {
        match self.grid.get(target) {
            Some(Cell::Empty | Cell::Toxin) => true,
            Some(cell) => self.is_capturable_by(id, cell),
            None => false,
        }
    }

    fn penalize(&mut self, id: CreatureId, points: u32, hunger: u32) {
        self.population.sub_points(id, points);
        let max = self.config.max_hunger;
        self.population.creature_mut(id).add_hunger(hunger, max);
    }

    /// Vacate, relocate, resolve whatever was at `target`, occupy. Moving
    /// onto the current cell re-occupies it.
    pub(in crate::world) fn execute_move(&mut self, id: CreatureId, target: Position) {
        let from = self.population.creature(id).position;
        self.grid.set(from, Cell::Empty);
        let arrived = self.grid.get(target);
        self.population.creature_mut(id).position = target;
        match arrived {
            Some(Cell::Food) => self.feed(id, 0, FOOD_HUNGER_RELIEF),
            Some(Cell::Toxin) => {
                let (damage, max) = (self.config.toxin_damage, self.config.max_hunger);
                self.population.creature_mut(id).add_hunger(damage, max);
            }
            Some(Cell::Occupied(victim)) if victim != id => self.consume(id, victim),
            _ => {}
        }
        self.grid.set(target, Cell::Occupied(id));

        let max = self.config.max_hunger;
        let creature = self.population.creature_mut(id);
        creature.remember(target);
        if creature.add_hunger(1, max) {
            creature.dead = true;
        }
        self.population.sub_points(id, 1);
    }

    fn consume(&mut self, eater: CreatureId, victim: CreatureId) {
        let fat = self.population.points(victim) / FAT_DIVISOR;
        if self.population.creature(victim).is_alive() {
            self.population.sub_points(victim, fat);
            self.population.creature_mut(victim).dead = true;
            trace!(?eater, ?victim, fat, "ate living prey");
        }
        self.population.creature_mut(victim).captured = true;
        self.feed(eater, fat, fat);
    }

    /// Relieve the eater's hunger and credit `fat` points, less the share a
    /// living mother takes off her own hunger.
    fn feed(&mut self, id: CreatureId, fat: u32, relief: u32) {
        self.population.creature_mut(id).relieve_hunger(relief);
        let credited = match self.population.living_mother(id) {
            Some(mother) => {
                let share = (fat as u64 * MOTHER_FAT_SHARE_PERCENT / 100) as u32;
                self.population.creature_mut(mother).relieve_hunger(share);
                fat - share
            }
            None => fat,
        };
        self.population.add_points(id, credited);
    }

    /// Snapshot the thinker's colony mother if her pool beats the champion.
    fn update_champion(&mut self, id: CreatureId) {
        let root = self.population.colony_root(id);
        let Some(mother) = self.population.get(root) else {
            return;
        };
        let Some(goal_net) = mother.goal_net.as_ref().filter(|_| mother.is_alive()) else {
            return;
        };
        let points = self.population.points(root);
        if self.champion.as_ref().is_some_and(|c| points <= c.points) {
            return;
        }
        trace!(?root, points, "new champion");
        self.champion = Some(Champion {
            brain: mother.brain.clone(),
            goal_net: goal_net.clone(),
            points,
        });
    }
}
