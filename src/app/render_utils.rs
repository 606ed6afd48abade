use std::f32::consts::TAU;

use eframe::egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Vec2, vec2};

const CIRCLE_SEGMENTS: usize = 48;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn vertical_gradient(painter: &Painter, rect: Rect, top: Color32, bottom: Color32) {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(Shape::mesh(mesh));
}

/// Circle filled with a radial gradient: `center` at the middle, `mid` at 70 % of the radius,
/// `rim` at the edge.
pub(super) fn radial_gradient_circle(
    painter: &Painter,
    position: Pos2,
    radius: f32,
    center: Color32,
    mid: Color32,
    rim: Color32,
) {
    if radius <= 0.0 || !radius.is_finite() {
        return;
    }

    let mut mesh = Mesh::default();
    mesh.colored_vertex(position, center);
    for ring in [(0.7, mid), (1.0, rim)] {
        for segment in 0..CIRCLE_SEGMENTS {
            let angle = segment as f32 / CIRCLE_SEGMENTS as f32 * TAU;
            let offset = vec2(angle.cos(), angle.sin()) * radius * ring.0;
            mesh.colored_vertex(position + offset, ring.1);
        }
    }

    let segments = CIRCLE_SEGMENTS as u32;
    for segment in 0..segments {
        let next = (segment + 1) % segments;
        mesh.add_triangle(0, 1 + segment, 1 + next);

        let inner = 1 + segment;
        let inner_next = 1 + next;
        let outer = 1 + segments + segment;
        let outer_next = 1 + segments + next;
        mesh.add_triangle(inner, outer, outer_next);
        mesh.add_triangle(inner, outer_next, inner_next);
    }

    painter.add(Shape::mesh(mesh));
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Scene coordinates are relative to the canvas' top-left corner.
pub(super) fn scene_to_screen(rect: Rect, local: Vec2) -> Pos2 {
    rect.min + local
}

pub(super) fn screen_to_scene(rect: Rect, screen: Pos2) -> Vec2 {
    screen - rect.min
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn screen_and_scene_coordinates_round_trip() {
        let rect = Rect::from_min_size(pos2(350.0, 40.0), vec2(800.0, 600.0));
        let local = vec2(12.5, 480.0);
        assert_eq!(screen_to_scene(rect, scene_to_screen(rect, local)), local);
    }

    #[test]
    fn circles_partially_inside_are_visible() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-10.0, 50.0), 12.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 12.0));
    }

    #[test]
    fn blend_color_mixes_opaque_channels() {
        let mixed = blend_color(Color32::BLACK, Color32::WHITE, 0.5);
        assert_eq!((mixed.r(), mixed.g(), mixed.b(), mixed.a()), (127, 127, 127, 255));
        assert_eq!(with_alpha(Color32::WHITE, 2.0), Color32::WHITE);
    }
}
