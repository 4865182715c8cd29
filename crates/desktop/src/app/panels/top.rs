//! Top toolbar panel - Send/Push buttons, status and the settings window

use eframe::egui;
use egui_phosphor::regular;
use magnetboard_core::{PayloadFormat, GRID_SIZES};

use crate::app::MagnetBoardApp;
use crate::live_channel::LiveState;
use crate::ui::DeviceOp;

impl MagnetBoardApp {
    /// Idle label, or the in-flight / success / failure variant
    fn op_label(&self, op: DeviceOp, icon: &str, idle: &str, busy: &str, done: &str) -> String {
        if self.is_in_flight(op) {
            return format!("{} {}", regular::HOURGLASS, busy);
        }
        match self.feedback_for(op) {
            Some(feedback) if feedback.success => format!("{} {}", regular::CHECK, done),
            Some(_) => format!("{} Failed", regular::WARNING),
            None => format!("{} {}", icon, idle),
        }
    }

    pub(crate) fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Magnet Board");
                ui.separator();

                // Send is disabled for its own duration to prevent duplicate submissions
                let send_label = self.op_label(DeviceOp::Send, regular::PAPER_PLANE_TILT, "Send", "Sending…", "Sent");
                if ui
                    .add_enabled(!self.is_in_flight(DeviceOp::Send), egui::Button::new(send_label))
                    .on_hover_text(self.config.payload_format.label())
                    .clicked()
                {
                    self.start_send();
                }

                let push_label = self.op_label(DeviceOp::PushMagnets, regular::MAGNET, "Push magnets", "Pushing…", "Pushed");
                if ui
                    .add_enabled(!self.is_in_flight(DeviceOp::PushMagnets), egui::Button::new(push_label))
                    .clicked()
                {
                    self.start_push_magnets();
                }

                if ui.button(format!("{} Clear", regular::BROOM)).clicked() {
                    self.clear_grid();
                }

                ui.separator();

                if !self.in_flight.is_empty() {
                    ui.spinner();
                }
                ui.label(&self.status);

                // Settings cog and connection state on the right
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(regular::GEAR).on_hover_text("Settings").clicked() {
                        self.show_settings = true;
                    }
                    self.render_connection_badge(ui);
                });
            });
        });

        self.render_settings_window(ctx);
    }

    fn render_connection_badge(&self, ui: &mut egui::Ui) {
        let Some(address) = self.client.address() else {
            ui.colored_label(egui::Color32::YELLOW, format!("{} No device", regular::PLUGS));
            return;
        };

        let (icon, color, hover) = match self.client.live_state() {
            Some(LiveState::Open) => (regular::PLUGS_CONNECTED, egui::Color32::GREEN, "Live updates on".to_string()),
            Some(LiveState::Connecting) => (regular::PLUGS, egui::Color32::YELLOW, "Live channel connecting".to_string()),
            Some(state) => (regular::PLUGS, egui::Color32::GRAY, format!("Live channel {}", state.label())),
            None => (regular::PLUGS, egui::Color32::GRAY, "Live updates off".to_string()),
        };
        ui.colored_label(color, format!("{} {}", icon, address))
            .on_hover_text(hover);
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut show_settings = self.show_settings;

        egui::Window::new(format!("{} Settings", regular::GEAR))
            .open(&mut show_settings)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.heading("Device");
                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        ui.label("Address:");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.address_input)
                                .desired_width(180.0)
                                .hint_text("192.168.4.1 or host:port")
                        );
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            self.save_address();
                        }
                        if ui.button(format!("{} Save", regular::FLOPPY_DISK)).clicked() {
                            self.save_address();
                        }
                    });

                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(format!(
                            "Without a port, :{} is tried first, then :{}. Live updates use :{}.",
                            self.config.default_port, self.config.fallback_port, self.config.live_port
                        ))
                        .color(egui::Color32::GRAY)
                    );

                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        let probing = self.is_in_flight(DeviceOp::Probe);
                        if ui
                            .add_enabled(!probing, egui::Button::new(format!("{} Test connection", regular::WIFI_HIGH)))
                            .clicked()
                        {
                            self.start_probe();
                        }

                        if probing {
                            ui.spinner();
                            ui.label("Testing...");
                        } else if let Some(feedback) = self.feedback_for(DeviceOp::Probe) {
                            if feedback.success {
                                ui.colored_label(egui::Color32::GREEN, format!("{} Reachable", regular::CHECK));
                            } else {
                                ui.colored_label(egui::Color32::RED, format!("{} Unreachable", regular::WARNING));
                            }
                        }
                    });

                    ui.add_space(12.0);
                    ui.separator();
                    ui.add_space(8.0);

                    ui.heading("Grid");
                    ui.add_space(8.0);

                    let mut grid_size = self.config.grid_size;
                    egui::ComboBox::from_label("Size")
                        .selected_text(format!("{0}x{0}", grid_size))
                        .show_ui(ui, |ui| {
                            for size in GRID_SIZES {
                                ui.selectable_value(&mut grid_size, size, format!("{0}x{0}", size));
                            }
                        });
                    if grid_size != self.config.grid_size {
                        self.set_grid_size(grid_size);
                    }

                    let mut format = self.config.payload_format;
                    egui::ComboBox::from_label("Payload")
                        .selected_text(format.label())
                        .show_ui(ui, |ui| {
                            for option in PayloadFormat::ALL {
                                ui.selectable_value(&mut format, option, option.label());
                            }
                        });
                    if format != self.config.payload_format {
                        self.set_payload_format(format);
                    }

                    ui.add_space(4.0);

                    let mut live_updates = self.config.live_updates;
                    if ui.checkbox(&mut live_updates, "Stream cell changes live").changed() {
                        self.set_live_updates(live_updates);
                    }
                });
            });

        self.show_settings = show_settings;
    }
}
