use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::warn;

use crate::data::{Dataset, Metric, load_dataset};
use crate::scene::{EntityId, LayoutMode, Scene, SimulationConfig, StepReport};

mod canvas;
mod render_utils;
mod ui;

/// Startup choices taken from the command line.
#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    pub layout: LayoutMode,
    pub motion: bool,
}

pub struct HappinessApp {
    data_path: PathBuf,
    options: ViewOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    scene: Scene,
    source: String,
    skipped_rows: usize,
    region_count: usize,
    search: String,
    suggestion_cache: Option<SuggestionCache>,
    scatter_x: Metric,
    scatter_y: Metric,
    tuning: SimulationConfig,
    show_grid_overlay: bool,
    last_step: StepReport,
    canvas_sized: bool,
}

struct SuggestionCache {
    query: String,
    revision: u64,
    matches: Vec<EntityId>,
}

impl HappinessApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: PathBuf, options: ViewOptions) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: PathBuf) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&data_path).map_err(|error| {
                warn!(path = %data_path.display(), error = %format!("{error:#}"), "dataset load failed");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for HappinessApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(dataset) => {
                                AppState::Ready(Box::new(ViewModel::new(dataset, self.options)))
                            }
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the happiness dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => model.replace_dataset(dataset),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
