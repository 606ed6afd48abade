use eframe::egui::{self, Key, Rect, Ui};

use crate::scene::SceneEvent;

use super::super::ViewModel;
use super::super::render_utils::screen_to_scene;

impl ViewModel {
    /// Queues this frame's pointer and keyboard input; the scene applies it on its next step.
    pub(in crate::app) fn queue_canvas_input(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        match response.hover_pos() {
            Some(pointer) => {
                self.scene
                    .push_event(SceneEvent::PointerMoved(screen_to_scene(rect, pointer)));
            }
            None if self.scene.hover().is_some() => self.scene.push_event(SceneEvent::PointerLeft),
            None => {}
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.scene.push_event(SceneEvent::Pressed);
        }

        if ui.input(|input| input.key_pressed(Key::Escape)) {
            self.scene.push_event(SceneEvent::Escape);
        }

        if self.scene.hover().is_some() && response.hovered() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
    }
}
