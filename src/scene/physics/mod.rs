mod forces;
mod grid;

use eframe::egui::Vec2;

use super::Scene;
use super::config::SimulationConfig;
use super::entity::{Entity, EntityId};
use forces::{SeparationParams, SpringParams, drift_offset, ease_radius, relax_position, separate_pairs};
pub(in crate::scene) use grid::SpatialGrid;

const MOTION_EPSILON_SQ: f32 = 0.0004;

/// Cubic smoothstep `t² (3 − 2t)`.
fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear progress of the focus transition plus the entity it last applied to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::scene) struct FocusTransition {
    progress: f32,
    subject: Option<EntityId>,
}

impl FocusTransition {
    pub(in crate::scene) fn advance(
        &mut self,
        dt: f32,
        focus: Option<EntityId>,
        config: &SimulationConfig,
    ) {
        if let Some(id) = focus {
            self.subject = Some(id);
            self.progress = (self.progress + dt * config.focus_in_rate).min(1.0);
        } else {
            self.progress = (self.progress - dt * config.focus_out_rate).max(0.0);
            if self.progress <= 0.0 {
                self.subject = None;
            }
        }
    }

    pub(in crate::scene) fn eased(&self) -> f32 {
        smoothstep(self.progress)
    }

    /// The focused entity, or the one still fading out after focus was cleared.
    pub(in crate::scene) fn subject(&self) -> Option<EntityId> {
        self.subject
    }

    pub(in crate::scene) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub moving: bool,
    pub overlapping_pairs: usize,
    pub repaired: usize,
}

fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max_dt) } else { 0.0 }
}

struct TargetContext {
    focus: Option<EntityId>,
    hover: Option<EntityId>,
    center: Vec2,
    eased: f32,
    motion: bool,
    clock: f32,
}

fn resolve_target(entity: &Entity, context: &TargetContext, config: &SimulationConfig) -> Vec2 {
    let id = entity.id();
    match context.focus {
        Some(focus) if focus == id => {
            entity.anchor + (context.center - entity.anchor) * context.eased
        }
        Some(_) => entity.anchor,
        None if context.motion && context.hover != Some(id) => {
            entity.anchor
                + drift_offset(
                    entity.drift_phase,
                    context.clock,
                    config.drift_amplitude,
                    config.drift_period,
                )
        }
        None => entity.anchor,
    }
}

fn target_radius(entity: &Entity, config: &SimulationConfig) -> f32 {
    let base = entity.encoding.base_radius;
    if entity.focused {
        base * config.focus_scale
    } else if entity.hovered {
        base * config.hover_scale
    } else {
        base
    }
}

/// Grid cell size wide enough that any overlapping pair lands in adjacent cells.
fn separation_cell_size(entities: &[Entity], config: &SimulationConfig) -> f32 {
    let max_radius = entities
        .iter()
        .map(|entity| entity.radius)
        .filter(|radius| radius.is_finite())
        .fold(0.0f32, f32::max);
    config
        .cell_size
        .max(2.0 * max_radius + config.separation_margin)
}

pub(super) fn step_simulation(scene: &mut Scene, dt: f32) -> StepReport {
    let config = scene.config;
    let dt = clamp_dt(dt, config.max_dt);
    let focus = scene.interaction.focus();
    let hover = scene.interaction.hover();
    scene.focus_transition.advance(dt, focus, &config);

    if scene.entities.is_empty() {
        return StepReport::default();
    }

    scene.clock = (scene.clock + f64::from(dt)) % super::CLOCK_WRAP_SECS;
    let context = TargetContext {
        focus,
        hover,
        center: scene.viewport * 0.5,
        eased: scene.focus_transition.eased(),
        motion: scene.motion,
        clock: scene.clock as f32,
    };
    let spring = SpringParams {
        spring: config.spring,
        damping: config.damping,
        time_scale: dt * 60.0,
    };

    let mut moving = false;
    for entity in &mut scene.entities {
        entity.focused = focus == Some(entity.id());
        entity.hovered = hover == Some(entity.id());
        entity.target = resolve_target(entity, &context, &config);

        relax_position(entity, spring);
        let radius = target_radius(entity, &config);
        ease_radius(entity, radius, config.size_ease, spring.time_scale);

        moving |= entity.velocity.length_sq() > MOTION_EPSILON_SQ;
    }

    scene.scratch_positions.clear();
    scene
        .scratch_positions
        .extend(scene.entities.iter().map(|entity| entity.position));
    let cell_size = separation_cell_size(&scene.entities, &config);
    scene
        .grid
        .rebuild(cell_size, scene.scratch_positions.iter().copied());

    let overlapping_pairs = if focus.is_none() {
        separate_pairs(
            &mut scene.entities,
            &scene.grid,
            &scene.scratch_positions,
            SeparationParams {
                strength: config.separation_strength,
                margin: config.separation_margin,
            },
        )
    } else {
        0
    };

    let mut repaired = 0usize;
    for entity in &mut scene.entities {
        if !entity.is_finite() {
            entity.settle();
            repaired += 1;
        }
    }
    if repaired > 0 {
        tracing::warn!(repaired, "reset non-finite entities to their anchors");
    }

    StepReport {
        moving: moving || overlapping_pairs > 0,
        overlapping_pairs,
        repaired,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::data::{CountryRecord, Metric};
    use crate::scene::encoding::MetricRanges;
    use crate::scene::entity::build_entities;
    use crate::scene::{LayoutMode, SceneEvent};

    fn pair_entities(distance: f32) -> (Vec<Entity>, SpatialGrid) {
        let records = vec![
            CountryRecord::new("Left", "R").with_metric(Metric::Happiness, Some(5.0)),
            CountryRecord::new("Right", "R").with_metric(Metric::Happiness, Some(7.0)),
        ];
        let ranges = MetricRanges::from_records(&records);
        let mut entities = build_entities(records, &ranges);
        entities[0].position = vec2(300.0, 300.0);
        entities[1].position = vec2(300.0 + distance, 300.0);
        (entities, SpatialGrid::new(120.0))
    }

    fn separation_pass(entities: &mut [Entity], grid: &mut SpatialGrid, config: &SimulationConfig) {
        let snapshot = entities.iter().map(|entity| entity.position).collect::<Vec<_>>();
        grid.rebuild(separation_cell_size(entities, config), snapshot.iter().copied());
        separate_pairs(
            entities,
            grid,
            &snapshot,
            SeparationParams {
                strength: config.separation_strength,
                margin: config.separation_margin,
            },
        );
    }

    fn scene_with(count: usize) -> Scene {
        let records = (0..count)
            .map(|index| {
                CountryRecord::new(format!("Country {index}"), "Region")
                    .with_metric(Metric::Happiness, Some(3.0 + index as f64 * 0.2))
            })
            .collect();
        Scene::new(
            records,
            LayoutMode::Grid,
            vec2(900.0, 600.0),
            SimulationConfig::default(),
        )
    }

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(9.0), 1.0);
    }

    #[test]
    fn dt_is_clamped_and_non_finite_dt_is_ignored() {
        assert_eq!(clamp_dt(5.0, 0.05), 0.05);
        assert_eq!(clamp_dt(-1.0, 0.05), 0.0);
        assert_eq!(clamp_dt(f32::NAN, 0.05), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY, 0.05), 0.0);
    }

    #[test]
    fn separation_pass_strictly_increases_distance() {
        let config = SimulationConfig::default();
        let (mut entities, mut grid) = pair_entities(20.0);

        separation_pass(&mut entities, &mut grid, &config);
        let distance = (entities[0].position - entities[1].position).length();
        assert!(distance > 20.0);
    }

    #[test]
    fn overlap_resolves_within_thirty_passes() {
        let config = SimulationConfig::default();
        let (mut entities, mut grid) = pair_entities(10.0);
        let required = entities[0].radius + entities[1].radius + config.separation_margin;

        let mut previous = 10.0;
        for _ in 0..30 {
            separation_pass(&mut entities, &mut grid, &config);
            let distance = (entities[0].position - entities[1].position).length();
            assert!(distance >= previous);
            previous = distance;
        }
        assert!(previous >= required - 0.05);
    }

    /// Pins entity `index` at rest on `position` with a fixed radius.
    fn pin(scene: &mut Scene, index: usize, position: Vec2, radius: f32) {
        let entity = &mut scene.entities[index];
        entity.anchor = position;
        entity.position = position;
        entity.target = position;
        entity.velocity = Vec2::ZERO;
        entity.radius = radius;
        entity.encoding.base_radius = radius;
    }

    #[test]
    fn wide_margin_pairs_in_non_adjacent_default_cells_are_separated() {
        let mut scene = scene_with(2);
        scene.set_motion(false);
        scene.set_config(SimulationConfig {
            separation_margin: 60.0,
            ..SimulationConfig::default()
        });
        pin(&mut scene, 0, vec2(119.0, 300.0), 44.0);
        pin(&mut scene, 1, vec2(250.0, 300.0), 44.0);

        let report = scene.step(1.0 / 60.0);
        let distance = (scene.entities()[0].position - scene.entities()[1].position).length();
        assert_eq!(report.overlapping_pairs, 1);
        assert!(distance > 131.0);
    }

    #[test]
    fn enlarged_radius_widens_the_cells() {
        let mut scene = scene_with(2);
        scene.set_motion(false);
        pin(&mut scene, 0, vec2(119.0, 300.0), 92.0);
        pin(&mut scene, 1, vec2(255.0, 300.0), 44.0);

        assert_eq!(separation_cell_size(&scene.entities, scene.config()), 190.0);
        let report = scene.step(1.0 / 60.0);
        assert_eq!(report.overlapping_pairs, 1);
    }

    #[test]
    fn focus_suspends_separation_of_overlapping_entities() {
        let mut scene = scene_with(3);
        scene.set_motion(false);
        let focus = scene.entities()[0].id();
        let left = vec2(600.0, 300.0);
        let right = vec2(620.0, 300.0);
        pin(&mut scene, 1, left, 30.0);
        pin(&mut scene, 2, right, 30.0);
        scene.push_event(SceneEvent::SetFocus(Some(focus)));

        for _ in 0..30 {
            let report = scene.frame(1.0 / 60.0);
            assert_eq!(report.overlapping_pairs, 0);
        }
        assert_eq!(scene.entities()[1].position, left);
        assert_eq!(scene.entities()[2].position, right);
    }

    #[test]
    fn coincident_entities_are_pushed_apart() {
        let config = SimulationConfig::default();
        let (mut entities, mut grid) = pair_entities(0.0);

        separation_pass(&mut entities, &mut grid, &config);
        let distance = (entities[0].position - entities[1].position).length();
        assert!(distance.is_finite());
        assert!(distance > 0.0);
    }

    #[test]
    fn focus_progress_eases_in_and_out() {
        let config = SimulationConfig::default();
        let mut transition = FocusTransition::default();
        let id = EntityId::new(3);

        transition.advance(0.1, Some(id), &config);
        let partial = transition.eased();
        assert!(partial > 0.0 && partial < 1.0);

        for _ in 0..20 {
            transition.advance(0.05, Some(id), &config);
        }
        assert_eq!(transition.eased(), 1.0);

        transition.advance(0.05, None, &config);
        assert_eq!(transition.subject(), Some(id));
        for _ in 0..20 {
            transition.advance(0.05, None, &config);
        }
        assert_eq!(transition.eased(), 0.0);
        assert_eq!(transition.subject(), None);
    }

    #[test]
    fn focused_entity_travels_to_the_viewport_center_and_grows() {
        let mut scene = scene_with(6);
        let id = scene.entities()[2].id();
        scene.push_event(SceneEvent::SetFocus(Some(id)));

        for _ in 0..240 {
            scene.frame(1.0 / 60.0);
        }

        let entity = scene.get(id).unwrap();
        assert!((entity.position - vec2(450.0, 300.0)).length() < 1.0);
        let expected = entity.encoding.base_radius * scene.config().focus_scale;
        assert!((entity.radius - expected).abs() < 0.01);
    }

    #[test]
    fn unfocused_entities_hold_their_anchor_during_focus() {
        let mut scene = scene_with(6);
        scene.set_motion(false);
        let focus = scene.entities()[0].id();
        scene.push_event(SceneEvent::SetFocus(Some(focus)));

        for _ in 0..240 {
            scene.frame(1.0 / 60.0);
        }

        for entity in scene.entities().iter().filter(|entity| entity.id() != focus) {
            assert!((entity.position - entity.anchor).length() < 0.5);
            assert!(!entity.focused);
        }
    }

    #[test]
    fn drift_keeps_entities_near_their_anchor() {
        let mut scene = scene_with(1);
        let amplitude = scene.config().drift_amplitude;
        for _ in 0..600 {
            scene.frame(1.0 / 60.0);
        }

        let entity = &scene.entities()[0];
        let offset = entity.position - entity.anchor;
        assert!(offset.x.abs() <= amplitude.x * 1.5);
        assert!(offset.y.abs() <= amplitude.y * 1.5);
    }

    #[test]
    fn stepping_an_empty_scene_is_a_no_op() {
        let mut scene = Scene::empty(SimulationConfig::default());
        let report = scene.frame(0.016);
        assert_eq!(report, StepReport::default());
        assert!(scene.is_empty());
    }

    proptest! {
        #[test]
        fn state_stays_finite_for_any_dt_sequence(
            dts in proptest::collection::vec(proptest::num::f32::ANY, 1..120),
            offsets in proptest::collection::vec((-5000.0f32..5000.0, -5000.0f32..5000.0), 8),
            focus_at in proptest::option::of(0usize..8),
        ) {
            let mut scene = scene_with(8);
            for (entity, (dx, dy)) in scene.entities.iter_mut().zip(offsets) {
                entity.position += vec2(dx, dy);
            }
            if let Some(index) = focus_at {
                let id = scene.entities()[index].id();
                scene.push_event(SceneEvent::SetFocus(Some(id)));
            }

            for dt in dts {
                scene.frame(dt);
                for entity in scene.entities() {
                    prop_assert!(entity.position.x.is_finite() && entity.position.y.is_finite());
                    prop_assert!(entity.radius.is_finite());
                }
                prop_assert!(scene.entities().iter().filter(|entity| entity.focused).count() <= 1);
                prop_assert!(scene.entities().iter().filter(|entity| entity.hovered).count() <= 1);
            }
        }
    }
}
