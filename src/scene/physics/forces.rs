use eframe::egui::{Vec2, vec2};

use super::super::entity::Entity;
use super::grid::SpatialGrid;

/// Distance substituted for coincident entities.
pub(super) const MIN_SEPARATION_DISTANCE: f32 = 0.1;

#[derive(Clone, Copy)]
pub(super) struct SpringParams {
    pub(super) spring: f32,
    pub(super) damping: f32,
    pub(super) time_scale: f32,
}

#[derive(Clone, Copy)]
pub(super) struct SeparationParams {
    pub(super) strength: f32,
    pub(super) margin: f32,
}

/// Damped spring toward `entity.target`: `v = (v + (t - p) * k) * d`, `p += v`.
pub(super) fn relax_position(entity: &mut Entity, params: SpringParams) {
    let pull = (entity.target - entity.position) * (params.spring * params.time_scale);
    let damping = params.damping.powf(params.time_scale);
    entity.velocity = (entity.velocity + pull) * damping;
    entity.position += entity.velocity * params.time_scale;
}

/// Exponential ease of the rendered radius, frame-rate independent.
pub(super) fn ease_radius(entity: &mut Entity, target_radius: f32, ease: f32, time_scale: f32) {
    let factor = 1.0 - (1.0 - ease.clamp(0.0, 1.0)).powf(time_scale);
    entity.radius += (target_radius - entity.radius) * factor;
}

pub(super) fn drift_offset(phase: Vec2, clock: f32, amplitude: Vec2, period: Vec2) -> Vec2 {
    let period = vec2(period.x.max(0.01), period.y.max(0.01));
    vec2(
        (clock / period.x + phase.x).sin() * amplitude.x,
        (clock / period.y + phase.y).cos() * amplitude.y,
    )
}

fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// One symmetric separation pass over neighbour candidates; each overlapping pair is
/// visited once and both members move apart by `strength × overlap`.
pub(super) fn separate_pairs(
    entities: &mut [Entity],
    grid: &SpatialGrid,
    snapshot: &[Vec2],
    params: SeparationParams,
) -> usize {
    let mut overlapping = 0usize;

    for from in 0..entities.len() {
        for to in grid.neighbors(snapshot[from]) {
            if to <= from {
                continue;
            }

            let delta = entities[from].position - entities[to].position;
            let distance = delta.length();
            let min_distance = entities[from].radius + entities[to].radius + params.margin;
            if distance >= min_distance {
                continue;
            }

            let (direction, distance) = if distance > MIN_SEPARATION_DISTANCE {
                (delta / distance, distance)
            } else {
                (fallback_direction(from, to), MIN_SEPARATION_DISTANCE)
            };

            let push = direction * ((min_distance - distance) * params.strength);
            entities[from].position += push;
            entities[to].position -= push;
            overlapping += 1;
        }
    }

    overlapping
}
