use eframe::egui::{Vec2, vec2};

/// Tunables for the per-frame simulation. Rates are expressed per 60 Hz frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub spring: f32,
    pub damping: f32,
    pub size_ease: f32,
    pub separation_strength: f32,
    pub separation_margin: f32,
    pub cell_size: f32,
    pub max_dt: f32,
    pub drift_amplitude: Vec2,
    pub drift_period: Vec2,
    pub focus_in_rate: f32,
    pub focus_out_rate: f32,
    pub focus_scale: f32,
    pub hover_scale: f32,
    pub hover_slop: f32,
    pub dim_opacity: f32,
    pub overlay_alpha: f32,
    pub scatter_padding: f32,
    pub grid_jitter: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spring: 0.14,
            damping: 0.84,
            size_ease: 0.18,
            separation_strength: 0.12,
            separation_margin: 6.0,
            cell_size: 120.0,
            max_dt: 0.05,
            drift_amplitude: vec2(8.0, 6.0),
            drift_period: vec2(1.2, 0.9),
            focus_in_rate: 3.5,
            focus_out_rate: 5.0,
            focus_scale: 2.1,
            hover_scale: 1.08,
            hover_slop: 1.08,
            dim_opacity: 0.18,
            overlay_alpha: 0.32,
            scatter_padding: 64.0,
            grid_jitter: 10.0,
        }
    }
}

impl SimulationConfig {
    /// Keeps user-tuned values inside the range where the spring stays stable.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        self.spring = finite_or(self.spring, defaults.spring).clamp(0.01, 0.4);
        self.damping = finite_or(self.damping, defaults.damping).clamp(0.5, 0.98);
        self.size_ease = finite_or(self.size_ease, defaults.size_ease).clamp(0.01, 1.0);
        self.separation_strength =
            finite_or(self.separation_strength, defaults.separation_strength).clamp(0.0, 0.5);
        self.separation_margin =
            finite_or(self.separation_margin, defaults.separation_margin).clamp(0.0, 64.0);
        self.cell_size = finite_or(self.cell_size, defaults.cell_size).max(8.0);
        self.max_dt = finite_or(self.max_dt, defaults.max_dt).clamp(0.001, 0.25);
        self
    }
}
