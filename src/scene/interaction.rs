use std::collections::VecDeque;

use eframe::egui::Vec2;
use tracing::debug;

use crate::data::Metric;

use super::Scene;
use super::entity::{Entity, EntityId};

/// Input the front end queues for the next frame.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    PointerMoved(Vec2),
    PointerLeft,
    Pressed,
    Escape,
    Search(String),
    SetFocus(Option<EntityId>),
    Compare(CompareSlot, Option<EntityId>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareSlot {
    A,
    B,
}

impl CompareSlot {
    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricDelta {
    pub metric: Metric,
    pub a: Option<f64>,
    pub b: Option<f64>,
    /// `a − b`, absent when either side is null.
    pub delta: Option<f64>,
}

pub struct Comparison<'a> {
    pub a: &'a Entity,
    pub b: &'a Entity,
    pub deltas: Vec<MetricDelta>,
}

pub(super) struct InteractionState {
    hover: Option<EntityId>,
    focus: Option<EntityId>,
    compare: [Option<EntityId>; 2],
    focus_on_compare: bool,
    queue: VecDeque<SceneEvent>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            hover: None,
            focus: None,
            compare: [None; 2],
            focus_on_compare: true,
            queue: VecDeque::new(),
        }
    }
}

impl InteractionState {
    pub(super) fn hover(&self) -> Option<EntityId> {
        self.hover
    }

    pub(super) fn focus(&self) -> Option<EntityId> {
        self.focus
    }

    /// Drops every identity reference; the compare option survives a reload.
    pub(super) fn reset(&mut self) {
        self.hover = None;
        self.focus = None;
        self.compare = [None; 2];
        self.queue.clear();
    }
}

/// Nearest entity whose forgiving hit circle contains `point`. While something is focused
/// only that entity can be hit.
fn hit_test(entities: &[Entity], point: Vec2, slop: f32, focus: Option<EntityId>) -> Option<EntityId> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }

    let mut best: Option<(EntityId, f32)> = None;
    for entity in entities {
        if focus.is_some_and(|focused| focused != entity.id()) {
            continue;
        }
        let reach = entity.radius * slop;
        let distance_sq = (entity.position - point).length_sq();
        if distance_sq >= reach * reach {
            continue;
        }
        if best.is_none_or(|(_, nearest)| distance_sq < nearest) {
            best = Some((entity.id(), distance_sq));
        }
    }
    best.map(|(id, _)| id)
}

/// Case-insensitive substring search. Best match starts earliest, then has the length
/// closest to the query, then the lowest identity.
fn best_match(entities: &[Entity], query: &str) -> Option<EntityId> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let query_len = query.chars().count();

    entities
        .iter()
        .filter_map(|entity| {
            let name = entity.name().to_lowercase();
            let byte_offset = name.find(&query)?;
            let start = name[..byte_offset].chars().count();
            let length_gap = name.chars().count().abs_diff(query_len);
            Some(((start, length_gap, entity.id()), entity.id()))
        })
        .min_by_key(|(key, _)| *key)
        .map(|(_, id)| id)
}

fn compare_records(a: &Entity, b: &Entity) -> Vec<MetricDelta> {
    Metric::COMPARED
        .iter()
        .map(|&metric| {
            let left = a.record.metric(metric);
            let right = b.record.metric(metric);
            MetricDelta {
                metric,
                a: left,
                b: right,
                delta: left.zip(right).map(|(left, right)| left - right),
            }
        })
        .collect()
}

impl Scene {
    pub fn push_event(&mut self, event: SceneEvent) {
        self.interaction.queue.push_back(event);
    }

    pub(super) fn drain_events(&mut self) {
        while let Some(event) = self.interaction.queue.pop_front() {
            self.apply_event(event);
        }
    }

    /// Applies one event immediately, bypassing the queue.
    pub fn apply_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::PointerMoved(point) => {
                let hit = hit_test(
                    &self.entities,
                    point,
                    self.config.hover_slop,
                    self.interaction.focus,
                );
                self.set_hover(hit);
            }
            SceneEvent::PointerLeft => self.set_hover(None),
            SceneEvent::Pressed => match self.interaction.hover {
                Some(hovered) if self.interaction.focus == Some(hovered) => self.set_focus(None),
                Some(hovered) => self.set_focus(Some(hovered)),
                None => self.set_focus(None),
            },
            SceneEvent::Escape => self.set_focus(None),
            SceneEvent::Search(query) => {
                self.search(&query);
            }
            SceneEvent::SetFocus(id) => self.set_focus(id),
            SceneEvent::Compare(slot, id) => self.set_compare(slot, id),
        }
    }

    pub fn hover(&self) -> Option<EntityId> {
        self.interaction.hover
    }

    pub fn focus(&self) -> Option<EntityId> {
        self.interaction.focus
    }

    pub fn hovered_entity(&self) -> Option<&Entity> {
        self.interaction.hover.and_then(|id| self.get(id))
    }

    pub fn focused_entity(&self) -> Option<&Entity> {
        self.interaction.focus.and_then(|id| self.get(id))
    }

    /// Focuses the best name match. Leaves focus untouched when nothing matches.
    pub fn search(&mut self, query: &str) -> Option<EntityId> {
        let found = best_match(&self.entities, query);
        debug!(query, found = ?found, "search");
        if found.is_some() {
            self.set_focus(found);
        }
        found
    }

    pub fn compare_selection(&self, slot: CompareSlot) -> Option<EntityId> {
        self.interaction.compare[slot.index()].filter(|&id| self.get(id).is_some())
    }

    pub fn focus_on_compare(&self) -> bool {
        self.interaction.focus_on_compare
    }

    pub fn set_focus_on_compare(&mut self, enabled: bool) {
        self.interaction.focus_on_compare = enabled;
    }

    /// Pairwise deltas once both compare slots name live entities.
    pub fn comparison(&self) -> Option<Comparison<'_>> {
        let a = self.get(self.compare_selection(CompareSlot::A)?)?;
        let b = self.get(self.compare_selection(CompareSlot::B)?)?;
        Some(Comparison {
            a,
            b,
            deltas: compare_records(a, b),
        })
    }

    fn resolve(&self, id: Option<EntityId>) -> Option<EntityId> {
        id.filter(|&id| self.get(id).is_some())
    }

    fn set_hover(&mut self, id: Option<EntityId>) {
        let id = self.resolve(id);
        if self.interaction.hover != id {
            debug!(from = ?self.interaction.hover, to = ?id, "hover changed");
            self.interaction.hover = id;
            self.sync_flags();
        }
    }

    fn set_focus(&mut self, id: Option<EntityId>) {
        let id = self.resolve(id);
        if self.interaction.focus == id {
            return;
        }
        debug!(from = ?self.interaction.focus, to = ?id, "focus changed");
        self.interaction.focus = id;
        if id.is_some() && self.interaction.hover != id {
            self.interaction.hover = None;
        }
        self.sync_flags();
    }

    fn set_compare(&mut self, slot: CompareSlot, id: Option<EntityId>) {
        let id = self.resolve(id);
        self.interaction.compare[slot.index()] = id;
        if slot == CompareSlot::A && self.interaction.focus_on_compare && id.is_some() {
            self.set_focus(id);
        }
    }

    fn sync_flags(&mut self) {
        let hover = self.interaction.hover;
        let focus = self.interaction.focus;
        for entity in &mut self.entities {
            entity.hovered = hover == Some(entity.id());
            entity.focused = focus == Some(entity.id());
        }
    }
}
