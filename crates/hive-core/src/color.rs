//! Display colours: the fixed content palette and the registry of colony
//! colours currently in use.

use crate::constants::{COLOR_ATTEMPTS, COLOR_MIN_BRIGHTNESS};
use crate::grid::Cell;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Perceived brightness (ITU-R BT.601 luma).
    pub fn brightness(self) -> f32 {
        0.299 * self.0 as f32 + 0.587 * self.1 as f32 + 0.114 * self.2 as f32
    }
}

pub const EMPTY_COLOR: Rgb = Rgb(20, 20, 20);
pub const WALL_COLOR: Rgb = Rgb(110, 110, 110);
pub const FOOD_COLOR: Rgb = Rgb(0, 200, 70);
pub const TOXIN_COLOR: Rgb = Rgb(170, 0, 200);

const PALETTE: [Rgb; 4] = [EMPTY_COLOR, WALL_COLOR, FOOD_COLOR, TOXIN_COLOR];

/// Fill colour for non-creature content; `None` for occupied cells, which
/// take the creature's own colour.
pub fn content_color(cell: Cell) -> Option<Rgb> {
    match cell {
        Cell::Empty => Some(EMPTY_COLOR),
        Cell::Wall => Some(WALL_COLOR),
        Cell::Food => Some(FOOD_COLOR),
        Cell::Toxin => Some(TOXIN_COLOR),
        Cell::Occupied(_) => None,
    }
}

/// Cyan-ish colour shown when the registry cannot find a free one. Never
/// reserved.
pub fn fallback_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb(50, rng.random_range(120..=255), rng.random_range(120..=255))
}

#[derive(Clone, Debug, Default)]
pub struct ColorRegistry {
    taken: HashSet<Rgb>,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw and reserve a bright colour distinct from every reserved colour
    /// and the content palette. `None` after `COLOR_ATTEMPTS` misses.
    pub fn reserve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Rgb> {
        for _ in 0..COLOR_ATTEMPTS {
            let color = Rgb(
                rng.random_range(30..=255),
                rng.random_range(30..=255),
                rng.random_range(30..=255),
            );
            if color.brightness() > COLOR_MIN_BRIGHTNESS
                && !PALETTE.contains(&color)
                && self.taken.insert(color)
            {
                return Some(color);
            }
        }
        None
    }

    /// Reserve a specific colour. Fails if it is already held.
    pub fn claim(&mut self, color: Rgb) -> bool {
        self.taken.insert(color)
    }

    pub fn release(&mut self, color: Rgb) -> bool {
        self.taken.remove(&color)
    }

    pub fn is_reserved(&self, color: Rgb) -> bool {
        self.taken.contains(&color)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn reserved_colours_are_bright_and_unique() {
        let mut rng = create_rng(31);
        let mut registry = ColorRegistry::new();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let c = registry.reserve(&mut rng).unwrap();
            assert!(c.brightness() > COLOR_MIN_BRIGHTNESS);
            assert!(c.0 >= 30 && c.1 >= 30 && c.2 >= 30);
            assert!(seen.insert(c));
        }
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn release_frees_the_colour() {
        let mut rng = create_rng(32);
        let mut registry = ColorRegistry::new();
        let c = registry.reserve(&mut rng).unwrap();
        assert!(registry.is_reserved(c));
        assert!(registry.release(c));
        assert!(!registry.is_reserved(c));
        assert!(!registry.release(c));
        assert!(registry.is_empty());
    }

    #[test]
    fn claim_refuses_a_held_colour() {
        let mut rng = create_rng(33);
        let mut registry = ColorRegistry::new();
        let c = registry.reserve(&mut rng).unwrap();
        assert!(!registry.claim(c));
        assert!(registry.release(c));
        assert!(registry.claim(c));
        assert_eq!(registry.len(), 1);
        let f = fallback_color(&mut rng);
        assert_eq!(f.0, 50);
        assert!(!registry.is_reserved(f));
    }

    #[test]
    fn palette_covers_every_plain_content() {
        assert_eq!(content_color(Cell::Wall), Some(WALL_COLOR));
        assert_eq!(content_color(Cell::Toxin), Some(TOXIN_COLOR));
        let mut ids = slotmap::SlotMap::<crate::creature::CreatureId, ()>::with_key();
        assert_eq!(content_color(Cell::Occupied(ids.insert(()))), None);
    }
}
