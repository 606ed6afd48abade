use std::f32::consts::PI;
use std::fmt;

use eframe::egui::{Vec2, vec2};

use crate::data::CountryRecord;
use crate::util::stable_pair_salted;

use super::encoding::{MetricRanges, VisualEncoding};

const DRIFT_SALT: u64 = 0x6472_6966_74;

/// Stable identity assigned at load time; never reused while the dataset is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub(super) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    pub record: CountryRecord,
    pub encoding: VisualEncoding,
    pub position: Vec2,
    pub velocity: Vec2,
    pub target: Vec2,
    pub anchor: Vec2,
    pub radius: f32,
    pub drift_phase: Vec2,
    pub hovered: bool,
    pub focused: bool,
}

impl Entity {
    pub(super) fn new(id: EntityId, record: CountryRecord, ranges: &MetricRanges) -> Self {
        let encoding = VisualEncoding::for_record(&record, ranges);
        let (phase_x, phase_y) = stable_pair_salted(&record.name, DRIFT_SALT);

        Self {
            id,
            radius: encoding.base_radius,
            record,
            encoding,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target: Vec2::ZERO,
            anchor: Vec2::ZERO,
            drift_phase: vec2(phase_x * PI, phase_y * PI),
            hovered: false,
            focused: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.velocity.x.is_finite()
            && self.velocity.y.is_finite()
            && self.radius.is_finite()
    }

    /// Puts the entity at rest on its anchor.
    pub(super) fn settle(&mut self) {
        self.position = self.anchor;
        self.target = self.anchor;
        self.velocity = Vec2::ZERO;
        self.radius = self.encoding.base_radius;
    }
}

pub(super) fn build_entities(records: Vec<CountryRecord>, ranges: &MetricRanges) -> Vec<Entity> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Entity::new(EntityId::new(index), record, ranges))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metric;

    #[test]
    fn ids_follow_load_order_and_drift_phase_follows_name() {
        let records = vec![
            CountryRecord::new("Chile", "Latin America").with_metric(Metric::Happiness, Some(6.3)),
            CountryRecord::new("Peru", "Latin America").with_metric(Metric::Happiness, Some(5.8)),
        ];
        let ranges = MetricRanges::from_records(&records);
        let entities = build_entities(records.clone(), &ranges);

        assert_eq!(entities[0].id(), EntityId::new(0));
        assert_eq!(entities[1].id(), EntityId::new(1));

        let reordered = build_entities(vec![records[1].clone()], &ranges);
        assert_eq!(reordered[0].drift_phase, entities[1].drift_phase);
        assert_eq!(reordered[0].encoding, entities[1].encoding);
    }
}
