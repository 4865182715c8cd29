//! Central grid canvas - drag painting

use eframe::egui;
use magnetboard_core::Cell;

use crate::app::MagnetBoardApp;
use crate::ui::{to_color32, uncovered_cell_at};

const MIN_CELL_SIZE: f32 = 12.0;
const CELL_GAP: f32 = 1.0;

impl MagnetBoardApp {
    pub(crate) fn render_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let size = self.session.grid().size();
            let available = ui.available_size();
            let side = available.x.min(available.y).max(MIN_CELL_SIZE * size as f32);

            let (response, painter) = ui.allocate_painter(egui::vec2(side, side), egui::Sense::click_and_drag());
            let rect = response.rect;

            let (pressed, down, pos) = ui.input(|i| {
                (i.pointer.primary_pressed(), i.pointer.primary_down(), i.pointer.interact_pos())
            });
            // Cells under the settings window or a popup are not painted
            let hovered_cell = pos.and_then(|p| uncovered_cell_at(ui.ctx(), ui.layer_id(), rect, p, size));

            if let Some((row, col)) = hovered_cell {
                let update = if pressed && response.hovered() {
                    self.session.pointer_down(row, col)
                } else {
                    // Only paints while a drag is in progress
                    self.session.pointer_over(row, col)
                };
                if let Some(update) = update {
                    self.forward_cell_update(update);
                }
            }

            // Released anywhere in the window ends the stroke
            if !down {
                self.session.pointer_up();
            }

            painter.rect_filled(rect, 4.0, egui::Color32::from_gray(30));
            let cell_side = side / size as f32;
            let empty = egui::Color32::from_gray(55);
            for (r, row) in self.session.grid().rows().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let min = rect.min + egui::vec2(c as f32 * cell_side, r as f32 * cell_side);
                    let cell_rect = egui::Rect::from_min_size(min, egui::vec2(cell_side, cell_side)).shrink(CELL_GAP);
                    let fill = match cell {
                        Cell::Filled(color) => to_color32(*color),
                        Cell::Empty => empty,
                    };
                    painter.rect_filled(cell_rect, 2.0, fill);
                }
            }
        });
    }
}
