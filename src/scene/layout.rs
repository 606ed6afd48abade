use std::cmp::Ordering;

use eframe::egui::{Vec2, vec2};

use crate::data::Metric;
use crate::util::stable_pair;

use super::config::SimulationConfig;
use super::encoding::MetricRanges;
use super::entity::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Grid,
    Alphabetical,
    Rank,
    Region,
    Scatter { x: Metric, y: Metric },
}

impl LayoutMode {
    pub const DEFAULT_SCATTER: Self = Self::Scatter {
        x: Metric::Gdp,
        y: Metric::Happiness,
    };

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Alphabetical => "A→Z",
            Self::Rank => "Rank",
            Self::Region => "Region",
            Self::Scatter { .. } => "Scatter",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub cols: usize,
    pub rows: usize,
    pub cell: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutGeometry {
    Grid(GridGeometry),
    Axes {
        x: Metric,
        y: Metric,
        padding: f32,
        plot: Vec2,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    pub anchors: Vec<Vec2>,
    pub geometry: LayoutGeometry,
}

pub fn sanitize_viewport(viewport: Vec2) -> Vec2 {
    let axis = |value: f32| if value.is_finite() { value.max(1.0) } else { 1.0 };
    vec2(axis(viewport.x), axis(viewport.y))
}

/// Slot order for the sorted modes. `sort_by` is stable, so ties keep identity order.
fn sort_order(entities: &[Entity], mode: LayoutMode) -> Vec<usize> {
    let mut order = (0..entities.len()).collect::<Vec<_>>();
    match mode {
        LayoutMode::Grid | LayoutMode::Scatter { .. } => {}
        LayoutMode::Alphabetical => order.sort_by(|&a, &b| compare_names(&entities[a], &entities[b])),
        LayoutMode::Rank => order.sort_by(|&a, &b| {
            descending_metric(
                entities[a].record.metric(Metric::Happiness),
                entities[b].record.metric(Metric::Happiness),
            )
        }),
        LayoutMode::Region => order.sort_by(|&a, &b| {
            entities[a]
                .record
                .region
                .to_lowercase()
                .cmp(&entities[b].record.region.to_lowercase())
                .then_with(|| compare_names(&entities[a], &entities[b]))
        }),
    }
    order
}

fn compare_names(a: &Entity, b: &Entity) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
}

fn descending_metric(a: Option<f64>, b: Option<f64>) -> Ordering {
    let finite = |value: Option<f64>| value.filter(|value| value.is_finite());
    match (finite(a), finite(b)) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn grid_geometry(count: usize, viewport: Vec2) -> GridGeometry {
    let viewport = sanitize_viewport(viewport);
    let count = count.max(1);
    let cols = ((count as f32 * viewport.x / viewport.y).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    GridGeometry {
        cols,
        rows,
        cell: vec2(viewport.x / cols as f32, viewport.y / rows as f32),
    }
}

/// Computes resting anchors for every entity. Pure: identical inputs give identical anchors.
pub fn assign_anchors(
    entities: &[Entity],
    mode: LayoutMode,
    viewport: Vec2,
    ranges: &MetricRanges,
    config: &SimulationConfig,
) -> LayoutPlan {
    let viewport = sanitize_viewport(viewport);

    if let LayoutMode::Scatter { x, y } = mode {
        return scatter_anchors(entities, x, y, viewport, ranges, config.scatter_padding);
    }

    let geometry = grid_geometry(entities.len(), viewport);
    let jitter_limit = config
        .grid_jitter
        .min(geometry.cell.x.min(geometry.cell.y) * 0.25)
        .max(0.0);

    let mut anchors = vec![Vec2::ZERO; entities.len()];
    for (slot, index) in sort_order(entities, mode).into_iter().enumerate() {
        let col = slot % geometry.cols;
        let row = slot / geometry.cols;
        let center = vec2(
            (col as f32 + 0.5) * geometry.cell.x,
            (row as f32 + 0.5) * geometry.cell.y,
        );
        let (jx, jy) = stable_pair(entities[index].name());
        anchors[index] = center + vec2(jx, jy) * jitter_limit;
    }

    LayoutPlan {
        anchors,
        geometry: LayoutGeometry::Grid(geometry),
    }
}

fn scatter_anchors(
    entities: &[Entity],
    x_metric: Metric,
    y_metric: Metric,
    viewport: Vec2,
    ranges: &MetricRanges,
    padding: f32,
) -> LayoutPlan {
    let padding = padding
        .min(viewport.x * 0.25)
        .min(viewport.y * 0.25)
        .max(0.0);
    let plot = vec2(
        (viewport.x - 2.0 * padding).max(1.0),
        (viewport.y - 2.0 * padding).max(1.0),
    );

    let anchors = entities
        .iter()
        .map(|entity| {
            let nx = ranges.normalize(&entity.record, x_metric);
            let ny = ranges.normalize(&entity.record, y_metric);
            vec2(padding + nx * plot.x, padding + (1.0 - ny) * plot.y)
        })
        .collect();

    LayoutPlan {
        anchors,
        geometry: LayoutGeometry::Axes {
            x: x_metric,
            y: y_metric,
            padding,
            plot,
        },
    }
}
