use eframe::egui::{self, RichText, Ui};

use crate::data::{Metric, format_metric};
use crate::scene::{Entity, SceneEvent};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let Some(entity) = self.scene.focused_entity() else {
            return;
        };
        let ranges = self.scene.ranges();
        let mut close = false;

        ui.horizontal(|ui| {
            ui.heading(entity.name());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                close = ui.button("Close").clicked();
            });
        });
        ui.label(entity.record.region.as_str());
        ui.label(format!(
            "Happiness: {}",
            format_metric(entity.record.metric(Metric::Happiness), 3)
        ));
        ui.add_space(6.0);
        ui.separator();

        egui::Grid::new("detail_metrics")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                for metric in Metric::ALL {
                    let value = entity.record.metric(metric);
                    let normalized = if value.is_some() {
                        ranges.normalize(&entity.record, metric)
                    } else {
                        0.0
                    };

                    ui.label(metric.label()).on_hover_text(metric.column());
                    ui.add(
                        egui::ProgressBar::new(normalized)
                            .desired_width(150.0)
                            .text(format_metric(value, 3)),
                    );
                    ui.end_row();
                }
            });

        ui.add_space(6.0);
        ui.small("Bars are scaled to the lowest and highest value in the dataset.");

        if close {
            self.scene.push_event(SceneEvent::SetFocus(None));
        }
    }

    pub(in crate::app) fn tooltip_ui(ui: &mut Ui, entity: &Entity) {
        let record = &entity.record;
        ui.label(RichText::new(entity.name()).strong());
        ui.label(RichText::new(record.region.as_str()).weak());
        for (label, metric) in [
            ("Happiness", Metric::Happiness),
            ("GDP", Metric::Gdp),
            ("Life expectancy", Metric::LifeExpectancy),
            ("Freedom", Metric::Freedom),
        ] {
            ui.label(format!("{label}: {}", format_metric(record.metric(metric), 3)));
        }
    }
}
