use eframe::egui::{self, Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, Vec2, vec2};

use crate::data::Metric;
use crate::scene::{Drawable, LayoutGeometry, MetricRanges};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, radial_gradient_circle, scene_to_screen, vertical_gradient,
    with_alpha,
};

const BACKGROUND_TOP: Color32 = Color32::from_rgb(0x1a, 0x23, 0x32);
const BACKGROUND_BOTTOM: Color32 = Color32::from_rgb(0x22, 0x3a, 0x5f);
const AXIS_COLOR: Color32 = Color32::from_rgba_premultiplied(70, 70, 70, 70);
const GRID_OVERLAY_COLOR: Color32 = Color32::from_rgb(106, 198, 255);

const GLOW_THRESHOLD: f32 = 0.1;
const GLOW_LAYERS: usize = 4;
const GLOW_REACH: f32 = 16.0;
const MIN_LABEL_RADIUS: f32 = 12.0;

fn draw_entity(painter: &Painter, rect: Rect, drawable: &Drawable<'_>) {
    let center = scene_to_screen(rect, drawable.position());
    let radius = drawable.radius();
    let glow = drawable.glow();
    if !circle_visible(rect, center, radius + glow * GLOW_REACH) {
        return;
    }

    let opacity = drawable.opacity;
    let encoding = &drawable.entity.encoding;

    if glow > GLOW_THRESHOLD {
        let halo = encoding.stop(1);
        for layer in (1..=GLOW_LAYERS).rev() {
            let t = layer as f32 / GLOW_LAYERS as f32;
            painter.circle_filled(
                center,
                radius + glow * GLOW_REACH * t,
                with_alpha(halo, glow * 0.16 * (1.0 - t * 0.5) * opacity),
            );
        }
    }

    radial_gradient_circle(
        painter,
        center,
        radius,
        with_alpha(encoding.stop(0), opacity),
        with_alpha(encoding.stop(1), opacity),
        with_alpha(encoding.stop(2), opacity),
    );

    painter.circle_stroke(
        center,
        radius,
        Stroke::new(
            drawable.border().min(radius * 0.5),
            with_alpha(Color32::WHITE, opacity * 0.85),
        ),
    );

    if radius >= MIN_LABEL_RADIUS {
        let scale = radius / encoding.base_radius.max(1.0);
        let label_color = blend_color(Color32::WHITE, encoding.stop(0), 0.1);
        painter.text(
            center,
            Align2::CENTER_CENTER,
            drawable.entity.name(),
            FontId::proportional(encoding.label_size * scale),
            with_alpha(label_color, opacity),
        );
    }
}

fn draw_axes(
    painter: &Painter,
    rect: Rect,
    (x, y): (Metric, Metric),
    padding: f32,
    plot: Vec2,
    ranges: &MetricRanges,
) {
    let origin = scene_to_screen(rect, vec2(padding, padding + plot.y));
    let x_end = origin + vec2(plot.x, 0.0);
    let y_end = origin - vec2(0.0, plot.y);
    let stroke = Stroke::new(1.0, AXIS_COLOR);
    painter.line_segment([origin, x_end], stroke);
    painter.line_segment([origin, y_end], stroke);

    let font = FontId::proportional(12.0);
    let text = Color32::from_gray(200);
    let x_range = ranges.range(x);
    let y_range = ranges.range(y);

    painter.text(
        x_end + vec2(0.0, 8.0),
        Align2::RIGHT_TOP,
        format!("{} →", x.label()),
        font.clone(),
        text,
    );
    painter.text(
        origin + vec2(0.0, 8.0),
        Align2::LEFT_TOP,
        format!("{:.2}", x_range.min),
        font.clone(),
        text,
    );
    painter.text(
        x_end + vec2(0.0, 24.0),
        Align2::RIGHT_TOP,
        format!("{:.2}", x_range.max),
        font.clone(),
        text,
    );
    painter.text(
        y_end - vec2(0.0, 8.0),
        Align2::LEFT_BOTTOM,
        format!("↑ {}", y.label()),
        font.clone(),
        text,
    );
    painter.text(
        origin - vec2(8.0, 0.0),
        Align2::RIGHT_BOTTOM,
        format!("{:.2}", y_range.min),
        font.clone(),
        text,
    );
    painter.text(
        y_end - vec2(8.0, 0.0),
        Align2::RIGHT_TOP,
        format!("{:.2}", y_range.max),
        font,
        text,
    );
}

impl ViewModel {
    fn draw_grid_overlay(&self, painter: &Painter, rect: Rect) {
        for cell in self.scene.grid_cells() {
            let min = scene_to_screen(rect, cell.min);
            let cell_rect = Rect::from_min_size(min, Vec2::splat(cell.size));
            let alpha = (0.2 + cell.occupants.min(6) as f32 * 0.1).min(0.8);
            painter.rect_stroke(
                cell_rect,
                0.0,
                Stroke::new(1.0, with_alpha(GRID_OVERLAY_COLOR, alpha)),
                egui::StrokeKind::Inside,
            );
            painter.text(
                min + vec2(4.0, 4.0),
                Align2::LEFT_TOP,
                cell.occupants.to_string(),
                FontId::monospace(10.0),
                with_alpha(GRID_OVERLAY_COLOR, 0.8),
            );
        }
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);

        // First real size replaces the placeholder viewport; start on the anchors.
        if self.scene.resize(rect.size()) && !self.canvas_sized {
            self.scene.settle();
        }
        self.canvas_sized = true;
        self.queue_canvas_input(ui, rect, &response);
        let dt = ui.input(|input| input.stable_dt);
        let report = self.scene.frame(dt);
        self.last_step = report;

        vertical_gradient(&painter, rect, BACKGROUND_TOP, BACKGROUND_BOTTOM);
        if self.scene.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No countries to show",
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
            return;
        }
        if let LayoutGeometry::Axes { x, y, padding, plot } = self.scene.geometry() {
            draw_axes(&painter, rect, (x, y), padding, plot, self.scene.ranges());
        }
        if self.show_grid_overlay {
            self.draw_grid_overlay(&painter, rect);
        }

        for drawable in self.scene.drawables().filter(|drawable| !drawable.emphasized) {
            draw_entity(&painter, rect, &drawable);
        }

        let overlay = self.scene.overlay_alpha();
        if overlay > 0.0 {
            painter.rect_filled(rect, 0.0, with_alpha(BACKGROUND_TOP, overlay));
        }

        for drawable in self.scene.drawables().filter(|drawable| drawable.emphasized) {
            draw_entity(&painter, rect, &drawable);
        }

        let progress = self.scene.focus_progress();
        let transition_active = progress > 0.0 && progress < 1.0;
        if report.moving || transition_active || self.scene.motion() {
            ui.ctx().request_repaint();
        }

        if response.hovered()
            && let Some(entity) = self.scene.hovered_entity()
        {
            response.on_hover_ui_at_pointer(|ui| Self::tooltip_ui(ui, entity));
        }
    }
}
