mod config;
mod encoding;
mod entity;
mod interaction;
mod layout;
mod physics;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::data::CountryRecord;

pub use config::SimulationConfig;
pub use encoding::MetricRanges;
pub use entity::{Entity, EntityId};
pub use interaction::{CompareSlot, SceneEvent};
pub use layout::{LayoutGeometry, LayoutMode};
pub use physics::StepReport;

use interaction::InteractionState;
use layout::{assign_anchors, sanitize_viewport};
use physics::{FocusTransition, SpatialGrid, step_simulation};

const CLOCK_WRAP_SECS: f64 = 86_400.0;

/// Live attributes the renderer needs for one entity in the current frame.
#[derive(Clone, Copy)]
pub struct Drawable<'a> {
    pub entity: &'a Entity,
    pub opacity: f32,
    /// Drawn above the focus dim overlay.
    pub emphasized: bool,
}

impl Drawable<'_> {
    pub fn position(&self) -> Vec2 {
        self.entity.position
    }

    pub fn radius(&self) -> f32 {
        self.entity.radius
    }

    pub fn border(&self) -> f32 {
        self.entity.encoding.border
    }

    pub fn glow(&self) -> f32 {
        self.entity.encoding.glow
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub min: Vec2,
    pub size: f32,
    pub occupants: usize,
}

/// Sole owner of the entity collection and all per-frame simulation state.
pub struct Scene {
    entities: Vec<Entity>,
    ranges: MetricRanges,
    revision: u64,
    layout: LayoutMode,
    geometry: LayoutGeometry,
    viewport: Vec2,
    config: SimulationConfig,
    motion: bool,
    clock: f64,
    focus_transition: FocusTransition,
    interaction: InteractionState,
    grid: SpatialGrid,
    scratch_positions: Vec<Vec2>,
}

impl Scene {
    pub fn new(
        records: Vec<CountryRecord>,
        layout: LayoutMode,
        viewport: Vec2,
        config: SimulationConfig,
    ) -> Self {
        let mut scene = Self::empty(config);
        scene.layout = layout;
        scene.viewport = sanitize_viewport(viewport);
        scene.replace_records(records);
        scene
    }

    pub fn empty(config: SimulationConfig) -> Self {
        let config = config.sanitized();
        Self {
            entities: Vec::new(),
            ranges: MetricRanges::from_records(&[]),
            revision: 0,
            layout: LayoutMode::Alphabetical,
            geometry: LayoutGeometry::Grid(layout::grid_geometry(0, vec2(1.0, 1.0))),
            viewport: vec2(1.0, 1.0),
            config,
            motion: true,
            clock: 0.0,
            focus_transition: FocusTransition::default(),
            interaction: InteractionState::default(),
            grid: SpatialGrid::new(config.cell_size),
            scratch_positions: Vec::new(),
        }
    }

    /// Swaps in a new dataset. Ranges, encodings and anchors are rebuilt together and every
    /// hover/focus/compare reference is dropped.
    pub fn replace_records(&mut self, records: Vec<CountryRecord>) {
        self.ranges = MetricRanges::from_records(&records);
        self.entities = entity::build_entities(records, &self.ranges);
        self.interaction.reset();
        self.focus_transition.reset();
        self.clock = 0.0;
        self.relayout();
        self.settle();
    }

    /// Snaps every entity onto its anchor at rest, without animating there.
    pub fn settle(&mut self) {
        for entity in &mut self.entities {
            entity.settle();
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index()).filter(|entity| entity.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Bumped whenever the collection or its anchors change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ranges(&self) -> &MetricRanges {
        &self.ranges
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.geometry
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        let config = config.sanitized();
        let relayout = config.scatter_padding != self.config.scatter_padding
            || config.grid_jitter != self.config.grid_jitter;
        self.config = config;
        if relayout {
            self.relayout();
        }
    }

    pub fn motion(&self) -> bool {
        self.motion
    }

    pub fn set_motion(&mut self, motion: bool) {
        self.motion = motion;
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        if self.layout != layout {
            self.layout = layout;
            self.relayout();
        }
    }

    /// Recomputes anchors synchronously when the viewport size changes.
    pub fn resize(&mut self, viewport: Vec2) -> bool {
        let viewport = sanitize_viewport(viewport);
        if (viewport - self.viewport).length_sq() < 0.25 {
            return false;
        }
        self.viewport = viewport;
        self.relayout();
        true
    }

    fn relayout(&mut self) {
        let plan = assign_anchors(
            &self.entities,
            self.layout,
            self.viewport,
            &self.ranges,
            &self.config,
        );
        for (entity, anchor) in self.entities.iter_mut().zip(plan.anchors) {
            entity.anchor = anchor;
        }
        self.geometry = plan.geometry;
        self.revision = self.revision.wrapping_add(1);
        debug!(
            layout = ?self.layout,
            width = self.viewport.x,
            height = self.viewport.y,
            entities = self.entities.len(),
            "layout recomputed"
        );
    }

    /// Drains queued input, then advances the simulation by `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> StepReport {
        self.drain_events();
        self.step(dt)
    }

    pub fn step(&mut self, dt: f32) -> StepReport {
        step_simulation(self, dt)
    }

    /// Eased focus transition progress in `[0, 1]`.
    pub fn focus_progress(&self) -> f32 {
        self.focus_transition.eased()
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.config.overlay_alpha * self.focus_progress()
    }

    pub fn drawables(&self) -> impl Iterator<Item = Drawable<'_>> + '_ {
        let eased = self.focus_progress();
        let subject = self.focus_transition.subject();
        let dim = self.config.dim_opacity;

        self.entities.iter().map(move |entity| {
            let base = entity.encoding.opacity;
            let emphasized = subject == Some(entity.id());
            let opacity = if emphasized {
                base + (1.0 - base) * eased
            } else {
                base + (dim - base) * eased
            };
            Drawable {
                entity,
                opacity: opacity.clamp(0.0, 1.0),
                emphasized: emphasized && eased > 0.0,
            }
        })
    }

    /// Occupied cells of the spatial index from the latest step.
    pub fn grid_cells(&self) -> Vec<GridCell> {
        let size = self.grid.cell_size();
        let mut cells = self
            .grid
            .occupied_cells()
            .map(|((x, y), occupants)| GridCell {
                min: vec2(x as f32 * size, y as f32 * size),
                size,
                occupants,
            })
            .collect::<Vec<_>>();
        cells.sort_by(|a, b| a.min.y.total_cmp(&b.min.y).then(a.min.x.total_cmp(&b.min.x)));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metric;

    fn records(names: &[&str]) -> Vec<CountryRecord> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                CountryRecord::new(*name, "Region")
                    .with_metric(Metric::Happiness, Some(4.0 + index as f64))
            })
            .collect()
    }

    #[test]
    fn new_scene_starts_at_rest_on_anchors() {
        let scene = Scene::new(
            records(&["A", "B", "C"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        for entity in scene.entities() {
            assert_eq!(entity.position, entity.anchor);
            assert_eq!(entity.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn layout_change_keeps_identity_and_moves_anchors_only() {
        let mut scene = Scene::new(
            records(&["Zeta", "Alpha", "Mu"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        let before = scene.entities().to_vec();
        let revision = scene.revision();

        scene.set_layout(LayoutMode::Alphabetical);

        assert!(scene.revision() > revision);
        for (old, new) in before.iter().zip(scene.entities()) {
            assert_eq!(old.id(), new.id());
            assert_eq!(old.name(), new.name());
            assert_eq!(old.position, new.position);
        }
        let alpha = scene.get(EntityId::new(1)).unwrap();
        assert_eq!(alpha.name(), "Alpha");
        assert!(alpha.anchor.x < scene.get(EntityId::new(0)).unwrap().anchor.x);
    }

    #[test]
    fn resize_recomputes_anchors_synchronously() {
        let mut scene = Scene::new(
            records(&["A", "B"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        let anchor = scene.entities()[0].anchor;

        assert!(!scene.resize(vec2(600.2, 400.0)));
        assert!(scene.resize(vec2(1200.0, 800.0)));
        assert_ne!(scene.entities()[0].anchor, anchor);
        assert_eq!(scene.viewport, vec2(1200.0, 800.0));
    }

    #[test]
    fn settle_after_resize_skips_the_animation() {
        let mut scene = Scene::new(
            records(&["A", "B", "C"]),
            LayoutMode::Grid,
            vec2(1000.0, 760.0),
            SimulationConfig::default(),
        );
        assert!(scene.resize(vec2(640.0, 360.0)));
        assert!(scene.entities().iter().any(|entity| entity.position != entity.anchor));

        scene.settle();
        for entity in scene.entities() {
            assert_eq!(entity.position, entity.anchor);
            assert_eq!(entity.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn replace_records_drops_stale_references() {
        let mut scene = Scene::new(
            records(&["A", "B", "C"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        scene.apply_event(SceneEvent::SetFocus(Some(EntityId::new(2))));
        assert_eq!(scene.focus(), Some(EntityId::new(2)));

        scene.replace_records(records(&["Only"]));

        assert_eq!(scene.focus(), None);
        assert!(scene.get(EntityId::new(2)).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn focus_dims_everyone_else() {
        let mut scene = Scene::new(
            records(&["A", "B"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        scene.push_event(SceneEvent::SetFocus(Some(EntityId::new(0))));
        for _ in 0..60 {
            scene.frame(1.0 / 60.0);
        }

        let drawables = scene.drawables().collect::<Vec<_>>();
        assert!(drawables[0].emphasized);
        assert_eq!(drawables[0].opacity, 1.0);
        assert!((drawables[1].opacity - scene.config().dim_opacity).abs() < 1e-5);
        assert!((scene.overlay_alpha() - scene.config().overlay_alpha).abs() < 1e-5);
    }

    #[test]
    fn grid_cells_report_occupancy_after_a_step() {
        let mut scene = Scene::new(
            records(&["A", "B", "C", "D"]),
            LayoutMode::Grid,
            vec2(600.0, 400.0),
            SimulationConfig::default(),
        );
        scene.frame(1.0 / 60.0);
        let occupants = scene.grid_cells().iter().map(|cell| cell.occupants).sum::<usize>();
        assert_eq!(occupants, 4);
    }
}
