//! Chunk-grid spatial index over all positioned entities.
//!
//! Each grid cell of edge [`CHUNK_SIZE`] tracks the set of entity refs
//! placed in it; a side map holds each ref's exact position for distance
//! refinement. The two maps are mutated only together, so any ref found in
//! a cell always has a position entry.
//!
//! Radius queries compute the bounding box of cells overlapping the disk,
//! union their sets, and keep only refs whose stored position is within the
//! radius. Results are unordered and duplicate-free.

use std::collections::{BTreeMap, BTreeSet};

use veldt_types::{EntityRef, Position};

use crate::constants::CHUNK_SIZE;

/// Grid coordinates of one cell.
type CellKey = (i64, i64);

/// The spatial index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialIndex {
    /// Cell -> set of refs placed in the cell.
    cells: BTreeMap<CellKey, BTreeSet<EntityRef>>,
    /// Ref -> exact position, for distance refinement.
    positions: BTreeMap<EntityRef, Position>,
}

/// Map a position onto its cell key.
// Positions are confined to [0, 1000), so the quotient always fits i64.
#[allow(clippy::cast_possible_truncation)]
fn cell_of(position: &Position) -> CellKey {
    (
        (position.x / CHUNK_SIZE).floor() as i64,
        (position.y / CHUNK_SIZE).floor() as i64,
    )
}

impl SpatialIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Number of refs currently indexed.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Place a ref at a position.
    ///
    /// Re-adding an already-present ref moves it instead.
    pub fn add(&mut self, entity: EntityRef, position: Position) {
        if let Some(old) = self.positions.get(&entity).copied() {
            self.relocate(entity, &old, position);
            return;
        }
        self.cells.entry(cell_of(&position)).or_default().insert(entity);
        self.positions.insert(entity, position);
    }

    /// Remove a ref. A no-op if the ref is not indexed.
    pub fn remove(&mut self, entity: EntityRef) {
        let Some(position) = self.positions.remove(&entity) else {
            return;
        };
        let key = cell_of(&position);
        if let Some(cell) = self.cells.get_mut(&key) {
            cell.remove(&entity);
            if cell.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    /// Move a ref to a new position.
    ///
    /// The cell map is untouched when both positions fall in the same cell.
    pub fn move_entity(&mut self, entity: EntityRef, new_position: Position) {
        let Some(old) = self.positions.get(&entity).copied() else {
            // Unknown refs are placed rather than dropped on the floor.
            self.add(entity, new_position);
            return;
        };
        self.relocate(entity, &old, new_position);
    }

    /// The stored position of a ref, if indexed.
    pub fn position_of(&self, entity: EntityRef) -> Option<Position> {
        self.positions.get(&entity).copied()
    }

    /// All refs within `radius` of `center` (inclusive boundary).
    pub fn in_radius(&self, center: &Position, radius: f64) -> Vec<EntityRef> {
        if radius < 0.0 {
            return Vec::new();
        }
        let min = cell_of(&Position::new(center.x - radius, center.y - radius));
        let max = cell_of(&Position::new(center.x + radius, center.y + radius));

        let mut found = Vec::new();
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for entity in cell {
                    if let Some(position) = self.positions.get(entity)
                        && position.distance_to(center) <= radius
                    {
                        found.push(*entity);
                    }
                }
            }
        }
        found
    }

    /// Iterate all indexed refs with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityRef, &Position)> {
        self.positions.iter()
    }

    /// Shared move implementation for `add`-on-duplicate and `move_entity`.
    fn relocate(&mut self, entity: EntityRef, old: &Position, new_position: Position) {
        let old_key = cell_of(old);
        let new_key = cell_of(&new_position);
        if old_key != new_key {
            if let Some(cell) = self.cells.get_mut(&old_key) {
                cell.remove(&entity);
                if cell.is_empty() {
                    self.cells.remove(&old_key);
                }
            }
            self.cells.entry(new_key).or_default().insert(entity);
        }
        self.positions.insert(entity, new_position);
    }
}
