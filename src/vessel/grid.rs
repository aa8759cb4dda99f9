//! Uniform grid of vessel positions for proximity queries.
//!
//! Rebuilt every frame before the proximity pulse.  A query returns every
//! vessel in the cells overlapping the search circle, so callers still do the
//! exact distance check.

use super::state::Vessel;
use crate::constants::GRID_CELL_SIZE;
use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Resource, Debug, Clone, Default)]
pub struct VesselGrid {
    cells: HashMap<(i32, i32), Vec<Entity>>,
}

impl VesselGrid {
    fn cell_of(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / GRID_CELL_SIZE).floor() as i32,
            (pos.y / GRID_CELL_SIZE).floor() as i32,
        )
    }

    fn reach(radius: f32) -> i32 {
        ((radius / GRID_CELL_SIZE).ceil() as i32).max(1)
    }

    pub fn insert(&mut self, entity: Entity, pos: Vec2) {
        self.cells.entry(Self::cell_of(pos)).or_default().push(entity);
    }

    /// Empty every cell, keeping the allocations of cells that were in use.
    pub fn clear(&mut self) {
        self.cells.retain(|_, v| !v.is_empty());
        for v in self.cells.values_mut() {
            v.clear();
        }
    }

    /// Candidates within `radius` of `pos`, excluding `entity` itself.
    pub fn candidates(
        &self,
        entity: Entity,
        pos: Vec2,
        radius: f32,
    ) -> impl Iterator<Item = Entity> + '_ {
        let (cx, cy) = Self::cell_of(pos);
        let reach = Self::reach(radius);
        (-reach..=reach)
            .flat_map(move |dx| (-reach..=reach).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .filter(move |&e| e != entity)
    }
}

pub fn rebuild_vessel_grid_system(
    mut grid: ResMut<VesselGrid>,
    q_vessels: Query<(Entity, &Transform), With<Vessel>>,
) {
    grid.clear();
    for (entity, transform) in q_vessels.iter() {
        grid.insert(entity, transform.translation.truncate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn query_covers_neighbouring_cells_only() {
        let e = entities(4);
        let mut grid = VesselGrid::default();
        grid.insert(e[0], Vec2::new(1.0, 1.0));
        grid.insert(e[1], Vec2::new(-1.0, 2.0));
        grid.insert(e[2], Vec2::new(5.0, 5.0));
        grid.insert(e[3], Vec2::new(40.0, 0.0));

        let found: Vec<Entity> = grid.candidates(e[0], Vec2::new(1.0, 1.0), 3.0).collect();
        assert!(found.contains(&e[1]));
        assert!(found.contains(&e[2]));
        assert!(!found.contains(&e[0]));
        assert!(!found.contains(&e[3]));
    }

    #[test]
    fn clear_forgets_previous_frame() {
        let e = entities(2);
        let mut grid = VesselGrid::default();
        grid.insert(e[1], Vec2::ZERO);
        grid.clear();
        assert_eq!(grid.candidates(e[0], Vec2::ZERO, 3.0).count(), 0);
    }
}
