//! Activity log panel

use eframe::egui;
use egui_phosphor::regular;

use crate::app::MagnetBoardApp;

impl MagnetBoardApp {
    pub(crate) fn render_activity_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("activity_panel")
            .resizable(true)
            .default_height(120.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("{} Activity", regular::LIST_BULLETS));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(regular::TRASH).on_hover_text("Clear log").clicked() {
                            self.activity.clear();
                        }
                    });
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if self.activity.is_empty() {
                            ui.label(egui::RichText::new("Nothing sent yet").color(egui::Color32::GRAY));
                        }
                        for entry in self.activity.entries() {
                            let time = entry.at.with_timezone(&chrono::Local).format("%H:%M:%S");
                            let (icon, color) = if entry.success {
                                (regular::CHECK, egui::Color32::GREEN)
                            } else {
                                (regular::WARNING, egui::Color32::RED)
                            };
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(time.to_string()).monospace().color(egui::Color32::GRAY));
                                ui.colored_label(color, icon);
                                ui.label(egui::RichText::new(entry.kind.label()).strong());
                                ui.label(&entry.message);
                            });
                        }
                    });
            });
    }
}
