use std::collections::HashMap;
use std::hash::Hash;

use super::GridCell;

/// Cell claims for editor placement. Each cell holds at most one occupant and
/// each occupant holds at most one cell.
#[derive(Debug, Clone)]
pub struct OccupancyIndex<Id> {
    by_cell: HashMap<GridCell, Id>,
    by_occupant: HashMap<Id, GridCell>,
}

impl<Id> Default for OccupancyIndex<Id> {
    fn default() -> Self {
        Self {
            by_cell: HashMap::new(),
            by_occupant: HashMap::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash> OccupancyIndex<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `cell` for `occupant`. Returns false and changes nothing when
    /// the cell is taken or the occupant already holds a cell.
    pub fn try_place(&mut self, cell: GridCell, occupant: Id) -> bool {
        if self.by_cell.contains_key(&cell) || self.by_occupant.contains_key(&occupant) {
            return false;
        }
        self.by_cell.insert(cell, occupant);
        self.by_occupant.insert(occupant, cell);
        true
    }

    pub fn remove(&mut self, occupant: Id) -> Option<GridCell> {
        let cell = self.by_occupant.remove(&occupant)?;
        self.by_cell.remove(&cell);
        Some(cell)
    }

    pub fn clear(&mut self) {
        self.by_cell.clear();
        self.by_occupant.clear();
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.by_cell.contains_key(&cell)
    }

    pub fn occupant_at(&self, cell: GridCell) -> Option<Id> {
        self.by_cell.get(&cell).copied()
    }

    pub fn cell_of(&self, occupant: Id) -> Option<GridCell> {
        self.by_occupant.get(&occupant).copied()
    }

    pub fn len(&self) -> usize {
        self.by_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_on_same_cell_is_rejected() {
        let mut index = OccupancyIndex::new();
        let cell = GridCell::new(1, 1);
        assert!(index.try_place(cell, 10_u64));
        assert!(!index.try_place(cell, 11_u64));
        assert_eq!(index.occupant_at(cell), Some(10));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_frees_the_cell_for_reuse() {
        let mut index = OccupancyIndex::new();
        let cell = GridCell::new(4, 0);
        assert!(index.try_place(cell, 1_u64));
        assert_eq!(index.remove(1), Some(cell));
        assert!(!index.is_occupied(cell));
        assert!(index.try_place(cell, 2));
    }

    #[test]
    fn removing_unknown_occupant_is_noop() {
        let mut index: OccupancyIndex<u64> = OccupancyIndex::new();
        assert!(index.try_place(GridCell::new(0, 0), 1));
        assert_eq!(index.remove(99), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn occupant_cannot_hold_two_cells() {
        let mut index = OccupancyIndex::new();
        assert!(index.try_place(GridCell::new(0, 0), 5_u64));
        assert!(!index.try_place(GridCell::new(0, 1), 5_u64));
        assert_eq!(index.cell_of(5), Some(GridCell::new(0, 0)));
    }

    #[test]
    fn clear_frees_everything() {
        let mut index = OccupancyIndex::new();
        for col in 0..5 {
            assert!(index.try_place(GridCell::new(col, 0), col as u64));
        }
        index.clear();
        assert!(index.is_empty());
        assert!(index.try_place(GridCell::new(0, 0), 42));
    }
}
