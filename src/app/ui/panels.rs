use eframe::egui::{self, Align, Context, Layout, Vec2};
use tracing::info;

use crate::data::{Dataset, Metric};
use crate::scene::{LayoutMode, Scene, SimulationConfig, StepReport};

use super::super::{ViewModel, ViewOptions};

/// Initial canvas size before the first frame reports the real one.
const INITIAL_VIEWPORT: Vec2 = Vec2::new(1000.0, 760.0);

impl ViewModel {
    pub(in crate::app) fn new(dataset: Dataset, options: ViewOptions) -> Self {
        let (scatter_x, scatter_y) = match options.layout {
            LayoutMode::Scatter { x, y } => (x, y),
            _ => (Metric::Gdp, Metric::Happiness),
        };

        let region_count = dataset.region_count();
        let skipped_rows = dataset.skipped_rows;
        let source = dataset.source;
        info!(
            source = %source,
            countries = dataset.records.len(),
            regions = region_count,
            skipped = skipped_rows,
            "dataset loaded"
        );

        let mut scene = Scene::new(
            dataset.records,
            options.layout,
            INITIAL_VIEWPORT,
            SimulationConfig::default(),
        );
        scene.set_motion(options.motion);
        let tuning = *scene.config();

        Self {
            scene,
            source,
            skipped_rows,
            region_count,
            search: String::new(),
            suggestion_cache: None,
            scatter_x,
            scatter_y,
            tuning,
            show_grid_overlay: false,
            last_step: StepReport::default(),
            canvas_sized: false,
        }
    }

    /// Swaps the whole collection at once; layout and tuning carry over.
    pub(in crate::app) fn replace_dataset(&mut self, dataset: Dataset) {
        self.region_count = dataset.region_count();
        self.skipped_rows = dataset.skipped_rows;
        self.source = dataset.source;
        info!(
            source = %self.source,
            countries = dataset.records.len(),
            "dataset reloaded"
        );
        self.scene.replace_records(dataset.records);
        self.suggestion_cache = None;
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Happiness Circles");
                    ui.separator();
                    ui.label(format!("source: {}", self.source));
                    ui.label(format!("countries: {}", self.scene.len()));
                    ui.label(format!("regions: {}", self.region_count));
                    if self.skipped_rows > 0 {
                        ui.label(format!("skipped rows: {}", self.skipped_rows))
                            .on_hover_text("Rows without a country name are left out.");
                    }
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
            });

        if self.scene.focused_entity().is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));
    }

    fn status_text(&self) -> String {
        let layout = self.scene.layout().label();
        let mut text = match self.scene.focused_entity() {
            Some(entity) => format!("{layout} · focused: {}", entity.name()),
            None => format!("{layout} · click a circle to focus, Esc to exit"),
        };
        if self.show_grid_overlay {
            text.push_str(&format!(" · overlaps: {}", self.last_step.overlapping_pairs));
        }
        if self.last_step.repaired > 0 {
            text.push_str(&format!(" · reset: {}", self.last_step.repaired));
        }
        text
    }
}
