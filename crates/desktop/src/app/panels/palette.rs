//! Palette side panel - color swatches and the erase toggle

use eframe::egui;
use egui_phosphor::regular;
use magnetboard_core::{Mode, DEFAULT_PALETTE};

use crate::app::MagnetBoardApp;
use crate::ui::to_color32;

const SWATCH_SIZE: f32 = 32.0;

impl MagnetBoardApp {
    pub(crate) fn render_palette_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("palette_panel")
            .resizable(false)
            .exact_width(SWATCH_SIZE * 2.0 + 32.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(format!("{} Color", regular::PALETTE));
                ui.add_space(4.0);

                let highlighted = self.session.highlighted_color();
                egui::Grid::new("swatches")
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        for (i, (color, name)) in DEFAULT_PALETTE.iter().enumerate() {
                            let (rect, response) = ui.allocate_exact_size(
                                egui::vec2(SWATCH_SIZE, SWATCH_SIZE),
                                egui::Sense::click(),
                            );
                            let painter = ui.painter();
                            painter.rect_filled(rect, 4.0, to_color32(*color));
                            painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, egui::Color32::GRAY), egui::StrokeKind::Inside);
                            if highlighted == Some(*color) {
                                painter.rect_stroke(
                                    rect,
                                    4.0,
                                    egui::Stroke::new(3.0, ui.visuals().selection.bg_fill),
                                    egui::StrokeKind::Outside,
                                );
                            }
                            if response.on_hover_text(*name).clicked() {
                                self.session.select_color(*color);
                            }
                            if i % 2 == 1 {
                                ui.end_row();
                            }
                        }
                    });

                ui.add_space(12.0);
                ui.separator();
                ui.add_space(8.0);

                let erasing = self.session.mode() == Mode::Erase;
                if ui
                    .selectable_label(erasing, format!("{} Erase", regular::ERASER))
                    .on_hover_text("Toggle erase mode")
                    .clicked()
                {
                    self.session.toggle_erase();
                }

                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(format!("{} filled", self.session.grid().filled_count()))
                        .color(egui::Color32::GRAY)
                );
            });
    }
}
