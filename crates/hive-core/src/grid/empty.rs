use super::Position;
use std::collections::HashMap;

/// Known-empty positions: a dense vector for O(1) random picks plus a
/// position → slot map for O(1) removal. Only the vector is ever iterated, so
/// ordering stays deterministic.
#[derive(Clone, Debug, Default)]
pub(crate) struct EmptyCells {
    slots: Vec<Position>,
    index: HashMap<Position, usize>,
}

impl EmptyCells {
    pub(crate) fn insert(&mut self, pos: Position) {
        if self.index.contains_key(&pos) {
            return;
        }
        self.index.insert(pos, self.slots.len());
        self.slots.push(pos);
    }

    pub(crate) fn remove(&mut self, pos: Position) -> bool {
        let Some(slot) = self.index.remove(&pos) else {
            return false;
        };
        self.slots.swap_remove(slot);
        if let Some(moved) = self.slots.get(slot) {
            self.index.insert(*moved, slot);
        }
        true
    }

    pub(crate) fn get(&self, slot: usize) -> Option<Position> {
        self.slots.get(slot).copied()
    }

    pub(crate) fn contains(&self, pos: Position) -> bool {
        self.index.contains_key(&pos)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RowKey;

    fn pos(column: usize, row: i64) -> Position {
        Position::new(column, RowKey(row))
    }

    #[test]
    fn swap_remove_keeps_index_in_sync() {
        let mut cells = EmptyCells::default();
        for c in 0..5 {
            cells.insert(pos(c, 0));
        }
        cells.insert(pos(2, 0));
        assert_eq!(cells.len(), 5);
        assert!(cells.remove(pos(1, 0)));
        assert!(!cells.remove(pos(1, 0)));
        assert_eq!(cells.len(), 4);
        for slot in 0..cells.len() {
            let p = cells.get(slot).unwrap();
            assert_eq!(cells.index[&p], slot);
        }
        assert!(cells.contains(pos(4, 0)));
        assert!(!cells.contains(pos(1, 0)));
    }
}
