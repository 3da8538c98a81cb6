use std::collections::BTreeMap;

use tracing::debug;

use crate::config::CoreConfig;
use crate::grid::{GridCell, OccupancyIndex};
use crate::level::{build_document, BuildOptions, EntityKind, LevelDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacedId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEntity {
    pub id: PlacedId,
    pub kind: EntityKind,
    pub cell: GridCell,
    pub label: String,
    pub texture: String,
}

impl PlacedEntity {
    /// Id written into built level documents.
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.kind.as_str(), self.id.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfBounds { cell: GridCell },
    SingletonExists { kind: EntityKind, existing: PlacedId },
    CellOccupied { cell: GridCell, occupant: PlacedId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementResult {
    Placed(PlacedId),
    Rejected(RejectReason),
}

impl PlacementResult {
    pub fn placed_id(self) -> Option<PlacedId> {
        match self {
            Self::Placed(id) => Some(id),
            Self::Rejected(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct LevelEditor {
    config: CoreConfig,
    occupancy: OccupancyIndex<PlacedId>,
    placed: BTreeMap<PlacedId, PlacedEntity>,
    next_id: u64,
}

impl LevelEditor {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            occupancy: OccupancyIndex::new(),
            placed: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn place(&mut self, cell: GridCell, kind: EntityKind) -> Option<PlacedId> {
        self.try_place(cell, kind).placed_id()
    }

    pub fn try_place(&mut self, cell: GridCell, kind: EntityKind) -> PlacementResult {
        if !self.in_bounds(cell) {
            return self.reject(kind, RejectReason::OutOfBounds { cell });
        }
        if kind.is_singleton() {
            if let Some(existing) = self.find_kind(kind) {
                return self.reject(kind, RejectReason::SingletonExists { kind, existing });
            }
        }

        let id = PlacedId(self.next_id);
        if !self.occupancy.try_place(cell, id) {
            let occupant = self.occupancy.occupant_at(cell).unwrap_or(id);
            return self.reject(kind, RejectReason::CellOccupied { cell, occupant });
        }
        self.next_id = self.next_id.saturating_add(1);
        self.placed.insert(
            id,
            PlacedEntity {
                id,
                kind,
                cell,
                label: display_label(kind).to_string(),
                texture: kind.as_str().to_string(),
            },
        );
        debug!(id = id.0, kind = kind.as_str(), cell = %cell, "entity_placed");
        PlacementResult::Placed(id)
    }

    pub fn remove(&mut self, id: PlacedId) -> bool {
        let Some(entity) = self.placed.remove(&id) else {
            return false;
        };
        self.occupancy.remove(id);
        debug!(id = id.0, kind = entity.kind.as_str(), "entity_removed");
        true
    }

    pub fn clear(&mut self) {
        self.placed.clear();
        self.occupancy.clear();
    }

    pub fn all_placed(&self) -> Vec<PlacedEntity> {
        self.placed.values().cloned().collect()
    }

    pub fn get(&self, id: PlacedId) -> Option<&PlacedEntity> {
        self.placed.get(&id)
    }

    pub fn placed_at(&self, cell: GridCell) -> Option<&PlacedEntity> {
        self.occupancy
            .occupant_at(cell)
            .and_then(|id| self.placed.get(&id))
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.occupancy.len()
    }

    pub fn build_document(&self, options: &BuildOptions) -> LevelDocument {
        build_document(&self.all_placed(), options, &self.config)
    }

    fn in_bounds(&self, cell: GridCell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && cell.col < self.config.grid_columns
            && cell.row < self.config.grid_rows
    }

    fn find_kind(&self, kind: EntityKind) -> Option<PlacedId> {
        self.placed
            .values()
            .find(|entity| entity.kind == kind)
            .map(|entity| entity.id)
    }

    fn reject(&self, kind: EntityKind, reason: RejectReason) -> PlacementResult {
        debug!(kind = kind.as_str(), ?reason, "placement_rejected");
        PlacementResult::Rejected(reason)
    }
}

fn display_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player => "Player",
        EntityKind::Enemy => "Enemy",
        EntityKind::Platform => "Tile",
        EntityKind::Goal => "Goal",
        EntityKind::Coin => "Coin",
        EntityKind::Obstacle => "Obstacle",
        EntityKind::Door => "Door",
        EntityKind::Trigger => "Trigger",
        EntityKind::Decoration => "Decoration",
        EntityKind::Spring => "Spring",
        EntityKind::Spike => "Spike",
        EntityKind::Unknown => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> LevelEditor {
        LevelEditor::new(CoreConfig::default())
    }

    #[test]
    fn place_remove_place_again_reuses_the_cell() {
        let mut editor = editor();
        let cell = GridCell::new(3, 2);
        let first = editor.place(cell, EntityKind::Platform).expect("first");
        assert!(editor.remove(first));
        let second = editor.place(cell, EntityKind::Platform).expect("second");
        assert_ne!(first, second);
        assert_eq!(editor.placed_at(cell).map(|entity| entity.id), Some(second));
    }

    #[test]
    fn second_player_is_rejected_even_on_a_free_cell() {
        let mut editor = editor();
        let first = editor
            .place(GridCell::new(0, 0), EntityKind::Player)
            .expect("player");
        let result = editor.try_place(GridCell::new(5, 5), EntityKind::Player);
        assert_eq!(
            result,
            PlacementResult::Rejected(RejectReason::SingletonExists {
                kind: EntityKind::Player,
                existing: first,
            })
        );
        let players = editor
            .all_placed()
            .into_iter()
            .filter(|entity| entity.kind == EntityKind::Player)
            .count();
        assert_eq!(players, 1);
        assert!(editor.placed_at(GridCell::new(5, 5)).is_none());
    }

    #[test]
    fn door_is_singleton_but_coins_are_not() {
        let mut editor = editor();
        assert!(editor.place(GridCell::new(1, 0), EntityKind::Door).is_some());
        assert!(editor.place(GridCell::new(2, 0), EntityKind::Door).is_none());
        assert!(editor.place(GridCell::new(3, 0), EntityKind::Coin).is_some());
        assert!(editor.place(GridCell::new(4, 0), EntityKind::Coin).is_some());
    }

    #[test]
    fn singleton_can_be_placed_again_after_removal() {
        let mut editor = editor();
        let door = editor.place(GridCell::new(1, 1), EntityKind::Door).expect("door");
        assert!(editor.remove(door));
        assert!(editor.place(GridCell::new(8, 1), EntityKind::Door).is_some());
    }

    #[test]
    fn occupied_cell_reports_occupant() {
        let mut editor = editor();
        let cell = GridCell::new(2, 2);
        let tile = editor.place(cell, EntityKind::Platform).expect("tile");
        assert_eq!(
            editor.try_place(cell, EntityKind::Coin),
            PlacementResult::Rejected(RejectReason::CellOccupied {
                cell,
                occupant: tile
            })
        );
        assert_eq!(editor.placed_count(), 1);
    }

    #[test]
    fn negative_or_out_of_range_cells_are_rejected() {
        let mut editor = editor();
        let columns = editor.config().grid_columns;
        let rows = editor.config().grid_rows;
        for cell in [
            GridCell::new(-1, 0),
            GridCell::new(0, -1),
            GridCell::new(columns, 0),
            GridCell::new(0, rows),
        ] {
            assert_eq!(
                editor.try_place(cell, EntityKind::Coin),
                PlacementResult::Rejected(RejectReason::OutOfBounds { cell })
            );
        }
        assert_eq!(editor.placed_count(), 0);
    }

    #[test]
    fn occupancy_count_tracks_placed_count() {
        let mut editor = editor();
        let mut ids = Vec::new();
        for col in 0..6 {
            ids.push(editor.place(GridCell::new(col, 0), EntityKind::Platform));
        }
        editor.place(GridCell::new(0, 0), EntityKind::Coin);
        assert_eq!(editor.placed_count(), editor.occupied_cell_count());

        editor.remove(ids[2].expect("id"));
        editor.remove(PlacedId(999));
        assert_eq!(editor.placed_count(), 5);
        assert_eq!(editor.placed_count(), editor.occupied_cell_count());

        editor.clear();
        assert_eq!(editor.placed_count(), 0);
        assert_eq!(editor.occupied_cell_count(), 0);
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let mut editor = editor();
        assert!(!editor.remove(PlacedId(42)));
    }

    #[test]
    fn document_ids_include_kind() {
        let mut editor = editor();
        let id = editor.place(GridCell::new(0, 0), EntityKind::Spring).expect("spring");
        assert_eq!(editor.get(id).expect("placed").document_id(), format!("spring_{}", id.0));
    }
}
