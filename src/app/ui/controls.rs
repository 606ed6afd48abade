use eframe::egui::{self, Key, Response, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::{Metric, format_metric};
use crate::scene::{CompareSlot, EntityId, LayoutMode, SceneEvent};

use super::super::{SuggestionCache, ViewModel};

const MAX_SUGGESTIONS: usize = 8;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

/// Arrow keys nudge a focused slider, faster the longer they are held.
fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    min: f32,
    max: f32,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let mut hold_state = ui
        .ctx()
        .data(|data| data.get_temp::<SliderKeyHoldState>(state_id).unwrap_or_default());
    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down { hold_state.positive_secs + delta_time } else { 0.0 };
    hold_state.negative_secs = if decrease_down { hold_state.negative_secs + delta_time } else { 0.0 };
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let step = ((max - min) / 200.0).max(0.0005);
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);

    let old_value = *value;
    *value = (*value + direction as f32 * step * speed * delta_time).clamp(min, max);
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn tuning_slider(ui: &mut Ui, value: &mut f32, min: f32, max: f32, text: &str, hint: &str) -> bool {
    let response = ui
        .add(
            egui::Slider::new(&mut *value, min..=max)
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hint);
    if response.hovered() {
        response.request_focus();
    }
    let dragged = response.changed();
    dragged | apply_slider_arrow_acceleration(ui, &response, value, min, max)
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn metric_picker(ui: &mut Ui, id: &str, label: &str, metric: &mut Metric) -> bool {
    let before = *metric;
    egui::ComboBox::from_id_salt(id)
        .selected_text(format!("{label}: {}", metric.label()))
        .width(220.0)
        .show_ui(ui, |ui| {
            for candidate in Metric::ALL {
                ui.selectable_value(metric, candidate, candidate.label());
            }
        });
    *metric != before
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();
        self.draw_layout_controls(ui);
        ui.separator();

        let mut motion = self.scene.motion();
        if ui
            .checkbox(&mut motion, "Ambient motion")
            .on_hover_text("Let circles drift gently around their resting spot.")
            .changed()
        {
            self.scene.set_motion(motion);
        }
        ui.checkbox(&mut self.show_grid_overlay, "Show spatial grid overlay")
            .on_hover_text("Draw the neighbour-search buckets used for collision separation.");

        ui.separator();
        egui::CollapsingHeader::new("Compare")
            .default_open(true)
            .show(ui, |ui| self.draw_compare(ui));

        ui.collapsing("Physics tuning", |ui| self.draw_physics_tuning(ui));
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search country")
            .on_hover_text("Enter focuses the best name match.");
        let response = ui.text_edit_singleline(&mut self.search);
        if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
            self.scene.push_event(SceneEvent::Search(self.search.clone()));
        }

        let mut picked = None;
        for id in self.suggestions() {
            let Some(entity) = self.scene.get(id) else {
                continue;
            };
            let selected = self.scene.focus() == Some(id);
            if ui
                .selectable_label(selected, format!("{}  ({})", entity.name(), entity.record.region))
                .clicked()
            {
                picked = Some((id, entity.name().to_owned()));
            }
        }

        if let Some((id, name)) = picked {
            self.search = name;
            self.scene.push_event(SceneEvent::SetFocus(Some(id)));
        }
    }

    fn suggestions(&mut self) -> Vec<EntityId> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let revision = self.scene.revision();
        if let Some(cache) = &self.suggestion_cache
            && cache.revision == revision
            && cache.query == query
        {
            return cache.matches.clone();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = self
            .scene
            .entities()
            .iter()
            .filter_map(|entity| {
                fuzzy_match_score(&matcher, entity.name(), query).map(|score| (score, entity.id()))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let matches = scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, id)| id)
            .collect::<Vec<_>>();

        self.suggestion_cache = Some(SuggestionCache {
            query: query.to_owned(),
            revision,
            matches: matches.clone(),
        });
        matches
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout").strong());
        let current = self.scene.layout();
        let scatter = LayoutMode::Scatter {
            x: self.scatter_x,
            y: self.scatter_y,
        };

        let mut next = None;
        ui.horizontal_wrapped(|ui| {
            for (mode, hint) in [
                (LayoutMode::Alphabetical, "Grid sorted by country name."),
                (LayoutMode::Rank, "Grid sorted by happiness, happiest first."),
                (LayoutMode::Region, "Grid grouped by region, then name."),
                (LayoutMode::Grid, "Grid in dataset order."),
                (scatter, "Plot one metric against another."),
            ] {
                let selected = std::mem::discriminant(&current) == std::mem::discriminant(&mode);
                if ui
                    .selectable_label(selected, mode.label())
                    .on_hover_text(hint)
                    .clicked()
                {
                    next = Some(mode);
                }
            }
        });

        if matches!(current, LayoutMode::Scatter { .. }) {
            let mut axes_changed = metric_picker(ui, "scatter_x", "X", &mut self.scatter_x);
            axes_changed |= metric_picker(ui, "scatter_y", "Y", &mut self.scatter_y);
            if axes_changed {
                next = Some(LayoutMode::Scatter {
                    x: self.scatter_x,
                    y: self.scatter_y,
                });
            }
        }

        if let Some(mode) = next {
            self.scene.set_layout(mode);
        }
    }

    fn draw_compare(&mut self, ui: &mut Ui) {
        let mut pending = Vec::new();
        for (slot, id_salt, label) in [
            (CompareSlot::A, "compare_a", "A"),
            (CompareSlot::B, "compare_b", "B"),
        ] {
            let current = self.scene.compare_selection(slot);
            let selected_text = current
                .and_then(|id| self.scene.get(id))
                .map_or_else(|| "–".to_owned(), |entity| entity.name().to_owned());

            ui.horizontal(|ui| {
                ui.label(label);
                egui::ComboBox::from_id_salt(id_salt)
                    .selected_text(selected_text)
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current.is_none(), "–").clicked() {
                            pending.push(SceneEvent::Compare(slot, None));
                        }
                        for entity in self.scene.entities() {
                            let id = entity.id();
                            if ui.selectable_label(current == Some(id), entity.name()).clicked() {
                                pending.push(SceneEvent::Compare(slot, Some(id)));
                            }
                        }
                    });
            });
        }

        let mut focus_on_compare = self.scene.focus_on_compare();
        if ui
            .checkbox(&mut focus_on_compare, "Focus A when chosen")
            .changed()
        {
            self.scene.set_focus_on_compare(focus_on_compare);
        }
        for event in pending {
            self.scene.push_event(event);
        }

        let Some(comparison) = self.scene.comparison() else {
            ui.weak("Pick two countries to compare.");
            return;
        };

        egui::Grid::new("compare_table")
            .num_columns(4)
            .striped(true)
            .show(ui, |ui| {
                ui.label("");
                ui.label(RichText::new(comparison.a.name()).strong());
                ui.label(RichText::new(comparison.b.name()).strong());
                ui.label(RichText::new("A − B").strong());
                ui.end_row();

                for delta in &comparison.deltas {
                    ui.label(delta.metric.label());
                    ui.label(format_metric(delta.a, 3));
                    ui.label(format_metric(delta.b, 3));
                    let text = match delta.delta {
                        Some(value) => format!("{value:+.3}"),
                        None => "–".to_owned(),
                    };
                    ui.label(text);
                    ui.end_row();
                }
            });
    }

    fn draw_physics_tuning(&mut self, ui: &mut Ui) {
        let mut changed = false;
        changed |= tuning_slider(
            ui,
            &mut self.tuning.spring,
            0.02,
            0.35,
            "Spring",
            "How strongly circles are pulled toward their target.",
        );
        changed |= tuning_slider(
            ui,
            &mut self.tuning.damping,
            0.6,
            0.95,
            "Damping",
            "Fraction of velocity kept each frame.",
        );
        changed |= tuning_slider(
            ui,
            &mut self.tuning.separation_strength,
            0.0,
            0.4,
            "Separation",
            "Share of the overlap resolved per frame.",
        );
        changed |= tuning_slider(
            ui,
            &mut self.tuning.separation_margin,
            0.0,
            24.0,
            "Margin",
            "Extra gap kept between neighbouring circles.",
        );

        if ui.button("Reset to defaults").clicked() {
            self.tuning = Default::default();
            changed = true;
        }

        if changed {
            self.scene.set_config(self.tuning);
        }
    }
}
