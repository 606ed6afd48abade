use std::collections::HashMap;

use eframe::egui::Vec2;

pub(in crate::scene) type CellKey = (i32, i32);

/// Uniform bucket grid over the plane, rebuilt from scratch every step.
pub(in crate::scene) struct SpatialGrid {
    cell_size: f32,
    buckets: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    pub(in crate::scene) fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            buckets: HashMap::new(),
        }
    }

    pub(in crate::scene) fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub(in crate::scene) fn cell_of(&self, position: Vec2) -> CellKey {
        // `as` saturates, so a stray non-finite coordinate lands in a valid bucket.
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub(in crate::scene) fn rebuild(&mut self, cell_size: f32, positions: impl Iterator<Item = Vec2>) {
        let cell_size = cell_size.max(1.0);
        if (cell_size - self.cell_size).abs() > f32::EPSILON {
            self.cell_size = cell_size;
            self.buckets.clear();
        }

        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        for (index, position) in positions.enumerate() {
            let key = self.cell_of(position);
            self.buckets.entry(key).or_default().push(index);
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Indices in the cell containing `position` and its eight neighbours.
    pub(in crate::scene) fn neighbors(&self, position: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(position);
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (cx.saturating_add(dx), cy.saturating_add(dy))))
            .filter_map(move |key| self.buckets.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    pub(in crate::scene) fn occupied_cells(&self) -> impl Iterator<Item = (CellKey, usize)> + '_ {
        self.buckets.iter().map(|(key, bucket)| (*key, bucket.len()))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn buckets_by_floor_of_position() {
        let grid = SpatialGrid::new(120.0);
        assert_eq!(grid.cell_of(vec2(0.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(vec2(119.9, 240.0)), (0, 2));
        assert_eq!(grid.cell_of(vec2(-0.1, -120.0)), (-1, -1));
    }

    #[test]
    fn neighbors_cover_the_three_by_three_block_only() {
        let mut grid = SpatialGrid::new(100.0);
        let positions = [
            vec2(150.0, 150.0),
            vec2(60.0, 60.0),
            vec2(290.0, 290.0),
            vec2(310.0, 150.0),
            vec2(150.0, -20.0),
        ];
        grid.rebuild(100.0, positions.iter().copied());

        let mut found = grid.neighbors(positions[0]).collect::<Vec<_>>();
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn rebuild_drops_stale_entries() {
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(50.0, [vec2(10.0, 10.0), vec2(20.0, 20.0)].into_iter());
        grid.rebuild(50.0, [vec2(500.0, 500.0)].into_iter());

        assert_eq!(grid.neighbors(vec2(10.0, 10.0)).count(), 0);
        assert_eq!(grid.occupied_cells().count(), 1);
    }
}
