use eframe::egui::Color32;

use crate::data::{CountryRecord, METRIC_COUNT, Metric};
use crate::palette::palette_for;

/// Normalised value used for absent or non-finite metrics.
pub const MISSING_NORMALIZED: f32 = 0.5;

const RADIUS_MIN: f32 = 16.0;
const RADIUS_SPAN: f32 = 28.0;
const BORDER_MIN: f32 = 2.0;
const BORDER_SPAN: f32 = 8.0;
const OPACITY_MIN: f32 = 0.45;
const OPACITY_SPAN: f32 = 0.55;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });

        if !min.is_finite() || !max.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        if max - min <= f64::EPSILON {
            return Self { min, max: min + 1.0 };
        }
        Self { min, max }
    }

    pub fn normalize(self, value: Option<f64>) -> f32 {
        match value {
            Some(value) if value.is_finite() => {
                let span = (self.max - self.min).max(f64::EPSILON);
                let ratio = (value - self.min) / span;
                if ratio.is_nan() {
                    MISSING_NORMALIZED
                } else {
                    ratio.clamp(0.0, 1.0) as f32
                }
            }
            _ => MISSING_NORMALIZED,
        }
    }
}

/// Population min/max snapshot, taken once per dataset load.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRanges {
    ranges: [MetricRange; METRIC_COUNT],
}

impl MetricRanges {
    pub fn from_records(records: &[CountryRecord]) -> Self {
        Self {
            ranges: Metric::ALL.map(|metric| {
                MetricRange::from_values(records.iter().filter_map(|record| record.metric(metric)))
            }),
        }
    }

    pub fn range(&self, metric: Metric) -> MetricRange {
        self.ranges[metric.index()]
    }

    pub fn normalize(&self, record: &CountryRecord, metric: Metric) -> f32 {
        self.range(metric).normalize(record.metric(metric))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualEncoding {
    pub base_radius: f32,
    pub border: f32,
    pub glow: f32,
    pub opacity: f32,
    pub label_size: f32,
    pub colors: Vec<Color32>,
}

impl VisualEncoding {
    pub fn for_record(record: &CountryRecord, ranges: &MetricRanges) -> Self {
        let happiness = ranges.normalize(record, Metric::Happiness);
        let support = ranges.normalize(record, Metric::SocialSupport);
        let life = ranges.normalize(record, Metric::LifeExpectancy);
        let corruption = ranges.normalize(record, Metric::Corruption);

        Self {
            base_radius: RADIUS_MIN + RADIUS_SPAN * happiness,
            border: BORDER_MIN + BORDER_SPAN * support,
            glow: life,
            opacity: OPACITY_MIN + OPACITY_SPAN * (1.0 - corruption),
            label_size: 10.0 + 4.0 * happiness,
            colors: palette_for(&record.name),
        }
    }

    /// Colour at gradient stop `slot` (0 = centre, 1 = 70 %, 2 = rim), falling back to earlier stops.
    pub fn stop(&self, slot: usize) -> Color32 {
        self.colors
            .get(slot.min(self.colors.len().saturating_sub(1)))
            .copied()
            .unwrap_or(Color32::WHITE)
    }
}
