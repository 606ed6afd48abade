mod app;
mod data;
mod palette;
mod scene;
mod util;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use scene::LayoutMode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Alphabetical,
    Rank,
    Region,
    Grid,
    Scatter,
}

impl From<LayoutArg> for LayoutMode {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Alphabetical => Self::Alphabetical,
            LayoutArg::Rank => Self::Rank,
            LayoutArg::Region => Self::Region,
            LayoutArg::Grid => Self::Grid,
            LayoutArg::Scatter => Self::DEFAULT_SCATTER,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// World Happiness Report export (.csv or .json).
    #[arg(long, default_value = "Data/World-happiness-report-2024.csv")]
    data: PathBuf,

    /// Initial arrangement of the circles.
    #[arg(long, value_enum, default_value_t = LayoutArg::Alphabetical)]
    layout: LayoutArg,

    /// Start with ambient drift switched off.
    #[arg(long)]
    no_motion: bool,

    /// Log filter directives, e.g. `debug` or `happiness_circles=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_filter: Option<String>,
}

fn init_logging(directives: Option<&str>) {
    let filter = directives
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref());

    let view_options = app::ViewOptions {
        layout: args.layout.into(),
        motion: !args.no_motion,
    };
    tracing::info!(data = %args.data.display(), layout = ?view_options.layout, "starting");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Happiness Circles",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::HappinessApp::new(
                cc,
                args.data.clone(),
                view_options,
            )))
        }),
    )
}
