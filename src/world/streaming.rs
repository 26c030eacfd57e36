//! Which chunks should exist around the observer
//!
//! Creation covers the square `[-render_distance, render_distance)` on both
//! axes around the observer's grid cell. Retirement is distance based, with
//! slack beyond the render distance so chunks at the edge are not recreated
//! right after being dropped. Cells inside the current square are never
//! retired: at small render distances a corner cell can lie past the
//! retirement radius, and it must not flip between created and retired.
//!
//! Sampling step by Chebyshev offset `d = max(|dx|, |dy|)` from the observer cell:
//!
//! | offset                      | step                                   |
//! |-----------------------------|----------------------------------------|
//! | `d < render_distance / 2`   | `cube_size`                            |
//! | otherwise                   | `cube_size * coarse_step_multiplier`   |
//!
//! With `render_distance < 2` the inner square is empty and every chunk is coarse.

use glam::{DVec2, DVec3};
use rustc_hash::FxHashMap;

use crate::core::chunk::GridCoord;
use crate::utils::settings::{GenerationParameters, StreamingSettings};

/// Cells to create and records to retire for one observer position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamingPlan {
    /// New cells with the sampling step they should be generated at.
    pub to_create: Vec<(GridCoord, f64)>,
    pub to_retire: Vec<GridCoord>,
}

impl StreamingPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_retire.is_empty()
    }
}

pub struct StreamingManager {
    params: GenerationParameters,
    settings: StreamingSettings,
}

impl StreamingManager {
    pub fn new(params: GenerationParameters, settings: StreamingSettings) -> Self {
        StreamingManager { params, settings }
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn settings(&self) -> &StreamingSettings {
        &self.settings
    }

    pub fn observer_grid(&self, observer: DVec3) -> GridCoord {
        GridCoord::from_world(observer, &self.params)
    }

    /// World distance beyond which a record is retired.
    pub fn retire_distance(&self) -> f64 {
        self.settings.render_distance as f64
            * self.params.world_chunk_size()
            * self.settings.retire_slack
    }

    /// Compare the live set against the observer's neighbourhood.
    ///
    /// `existing` is only used for membership, indexed by coordinate.
    pub fn reconcile<V>(
        &self,
        observer: DVec3,
        existing: &FxHashMap<GridCoord, V>,
    ) -> StreamingPlan {
        let centre = self.observer_grid(observer);
        let render_distance = self.settings.render_distance;

        let mut to_create = Vec::new();
        for dy in -render_distance..render_distance {
            for dx in -render_distance..render_distance {
                let coord = GridCoord::new(centre.x + dx, centre.y + dy);
                if !existing.contains_key(&coord) {
                    to_create.push((coord, self.sampling_step(dx, dy)));
                }
            }
        }

        let retire_distance = self.retire_distance();
        let mut to_retire: Vec<GridCoord> = existing
            .keys()
            .filter(|coord| !self.in_target_square(centre, **coord))
            .filter(|coord| self.horizontal_distance(observer, **coord) > retire_distance)
            .copied()
            .collect();
        to_retire.sort_unstable();

        StreamingPlan {
            to_create,
            to_retire,
        }
    }

    /// Whether `coord` lies in the creation square around `centre`.
    pub fn in_target_square(&self, centre: GridCoord, coord: GridCoord) -> bool {
        let render_distance = self.settings.render_distance;
        let dx = coord.x - centre.x;
        let dy = coord.y - centre.y;
        (-render_distance..render_distance).contains(&dx)
            && (-render_distance..render_distance).contains(&dy)
    }

    /// Distance in the horizontal plane between the observer and a chunk origin.
    pub fn horizontal_distance(&self, observer: DVec3, coord: GridCoord) -> f64 {
        let origin = coord.world_origin(&self.params);
        DVec2::new(observer.x, observer.y).distance(DVec2::new(origin.x, origin.y))
    }

    /// Two-tier detail policy; see the module table.
    pub fn sampling_step(&self, dx: i32, dy: i32) -> f64 {
        let inner = self.settings.render_distance / 2;
        let offset = dx.abs().max(dy.abs());
        if offset < inner {
            self.params.cube_size
        } else {
            self.params.cube_size * self.settings.coarse_step_multiplier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn manager(render_distance: i32) -> StreamingManager {
        StreamingManager::new(
            GenerationParameters {
                chunk_size: 100.0,
                scale: 2.0,
                cube_size: 10.0,
                ..Default::default()
            },
            StreamingSettings {
                render_distance,
                ..Default::default()
            },
        )
    }

    fn as_map(coords: impl IntoIterator<Item = GridCoord>) -> FxHashMap<GridCoord, ()> {
        coords.into_iter().map(|c| (c, ())).collect()
    }

    #[test]
    fn empty_world_creates_full_square() {
        let manager = manager(2);
        let plan = manager.reconcile(DVec3::ZERO, &FxHashMap::<GridCoord, ()>::default());

        let created: FxHashSet<GridCoord> = plan.to_create.iter().map(|(c, _)| *c).collect();
        assert_eq!(plan.to_create.len(), 16);
        assert_eq!(created.len(), 16);
        for x in -2..2 {
            for y in -2..2 {
                assert!(created.contains(&GridCoord::new(x, y)));
            }
        }
        assert!(plan.to_retire.is_empty());
    }

    #[test]
    fn square_follows_observer() {
        let manager = manager(1);
        // Cell width is 200 world units
        let plan = manager.reconcile(
            DVec3::new(610.0, -390.0, 0.0),
            &FxHashMap::<GridCoord, ()>::default(),
        );
        let created: FxHashSet<GridCoord> = plan.to_create.iter().map(|(c, _)| *c).collect();
        let expected: FxHashSet<GridCoord> = [
            GridCoord::new(2, -3),
            GridCoord::new(3, -3),
            GridCoord::new(2, -2),
            GridCoord::new(3, -2),
        ]
        .into_iter()
        .collect();
        assert_eq!(created, expected);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let manager = manager(3);
        let observer = DVec3::new(150.0, -20.0, 600.0);
        let first = manager.reconcile(observer, &FxHashMap::<GridCoord, ()>::default());
        let existing = as_map(first.to_create.iter().map(|(c, _)| *c));

        let second = manager.reconcile(observer, &existing);
        assert!(second.to_create.is_empty());
        assert!(second.to_retire.is_empty());
    }

    #[test]
    fn existing_cells_are_not_recreated() {
        let manager = manager(2);
        let existing = as_map([GridCoord::new(0, 0), GridCoord::new(-2, 1)]);
        let plan = manager.reconcile(DVec3::ZERO, &existing);
        assert_eq!(plan.to_create.len(), 14);
        assert!(
            plan.to_create
                .iter()
                .all(|(c, _)| !existing.contains_key(c))
        );
    }

    #[test]
    fn retirement_threshold_is_exclusive() {
        let manager = manager(2);
        // 2 cells * 200 units * 1.5 slack
        let limit = manager.retire_distance();
        assert_eq!(limit, 600.0);

        let chunk = GridCoord::new(0, 0);
        let existing = as_map([chunk]);
        let epsilon = 1e-6;

        let beyond = manager.reconcile(DVec3::new(limit + epsilon, 0.0, 0.0), &existing);
        assert_eq!(beyond.to_retire, vec![chunk]);

        let within = manager.reconcile(DVec3::new(limit - epsilon, 0.0, 0.0), &existing);
        assert!(within.to_retire.is_empty());
    }

    #[test]
    fn observer_altitude_does_not_retire() {
        let manager = manager(2);
        let existing = as_map([GridCoord::new(0, 0)]);
        let plan = manager.reconcile(DVec3::new(0.0, 0.0, 10_000.0), &existing);
        assert!(plan.to_retire.is_empty());
    }

    #[test]
    fn cells_outside_square_stay_within_slack() {
        // A cell can be outside the creation square but still inside the slack
        let manager = manager(2);
        let outside_square = GridCoord::new(2, 0);
        let existing = as_map([outside_square]);
        let plan = manager.reconcile(DVec3::ZERO, &existing);
        assert!(plan.to_retire.is_empty());
    }

    #[test]
    fn fixed_observer_settles_when_corner_is_past_retire_radius() {
        let manager = StreamingManager::new(
            GenerationParameters {
                chunk_size: 32.0,
                ..Default::default()
            },
            StreamingSettings {
                render_distance: 2,
                ..Default::default()
            },
        );
        let observer = DVec3::new(40.0, 0.0, 40.0);
        let corner = GridCoord::new(-1, -2);
        // Corner of the square sits just past the 96 unit radius
        assert!(manager.horizontal_distance(observer, corner) > manager.retire_distance());

        let mut existing: FxHashMap<GridCoord, ()> = FxHashMap::default();
        let mut settled = false;
        for _ in 0..4 {
            let plan = manager.reconcile(observer, &existing);
            if plan.is_empty() {
                settled = true;
                break;
            }
            for coord in &plan.to_retire {
                existing.remove(coord);
            }
            for (coord, _) in &plan.to_create {
                existing.insert(*coord, ());
            }
        }
        assert!(settled, "plan never became empty");
        assert_eq!(existing.len(), 16);
        assert!(existing.contains_key(&corner));
    }

    #[test]
    fn square_cells_are_never_retired() {
        let manager = manager(1);
        let observer = DVec3::new(90.0, 90.0, 0.0);
        let centre = manager.observer_grid(observer);
        let existing = as_map((-1..1).flat_map(|dy| {
            (-1..1).map(move |dx| GridCoord::new(centre.x + dx, centre.y + dy))
        }));
        let plan = manager.reconcile(observer, &existing);
        assert!(plan.to_retire.is_empty());
        assert!(plan.to_create.is_empty());
    }

    #[test]
    fn inner_square_gets_fine_step() {
        let manager = manager(4);
        let plan = manager.reconcile(DVec3::ZERO, &FxHashMap::<GridCoord, ()>::default());
        for (coord, step) in &plan.to_create {
            let offset = coord.x.abs().max(coord.y.abs());
            if offset < 2 {
                assert_eq!(*step, 10.0, "{coord:?}");
            } else {
                assert_eq!(*step, 20.0, "{coord:?}");
            }
        }
        let fine = plan.to_create.iter().filter(|(_, s)| *s == 10.0).count();
        // Offsets -1..=1 on both axes
        assert_eq!(fine, 9);
    }

    #[test]
    fn tiny_render_distance_is_all_coarse() {
        let manager = manager(1);
        assert_eq!(manager.sampling_step(0, 0), 20.0);
    }
}
