//! App state management - device operations and their results

use crate::device_client::PUSH_MAGNETS_ENDPOINT;
use crate::ui::{DeviceEvent, DeviceOp, Feedback};
use magnetboard_core::{
    build_payload, ActivityEntry, ActivityKind, CellUpdate, DeviceAddress, PayloadFormat,
};

use std::future::Future;

use super::MagnetBoardApp;

impl MagnetBoardApp {
    /// Run a device call on the runtime and hand its result back to the UI thread
    fn spawn_device_task<F>(&self, task: F)
    where
        F: Future<Output = DeviceEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = task.await;
            let _ = tx.send(event);
            ctx.request_repaint();
        });
    }

    pub(crate) fn log(&mut self, kind: ActivityKind, success: bool, message: impl Into<String>) {
        let entry = ActivityEntry::new(kind, success, message);
        self.status = entry.message.clone();
        self.activity.push(entry);
    }

    pub(crate) fn is_in_flight(&self, op: DeviceOp) -> bool {
        self.in_flight.contains(&op)
    }

    pub(crate) fn feedback_for(&self, op: DeviceOp) -> Option<&Feedback> {
        self.feedback.get(&op)
    }

    pub(crate) fn cleanup_expired_feedback(&mut self) {
        self.feedback.retain(|_, feedback| !feedback.is_expired());
    }

    pub(crate) fn open_live_channel_if_enabled(&self, address: &DeviceAddress) {
        if !self.config.live_updates {
            return;
        }
        let _guard = self.runtime.enter();
        self.client.open_live_channel(address);
    }

    /// Forward a painted cell to the device when live updates are on
    pub(crate) fn forward_cell_update(&self, update: CellUpdate) {
        if self.config.live_updates {
            self.client.send_cell_update(update);
        }
    }

    pub(crate) fn save_config(&mut self) {
        if let Err(e) = self.config.save_to(&self.config_path) {
            tracing::error!("{}", e);
            self.log(ActivityKind::Config, false, e.to_string());
        }
    }

    /// Persist the address typed in settings
    pub(crate) fn save_address(&mut self) {
        match self.client.set_address(&self.address_input) {
            Ok(address) => {
                self.config.device_address = address.to_string();
                self.address_input = address.to_string();
                self.log(ActivityKind::Config, true, format!("Device address saved: {}", address));
                self.open_live_channel_if_enabled(&address);
            }
            Err(e) => self.log(ActivityKind::Config, false, e.to_string()),
        }
    }

    /// Probe the address typed in settings; it is saved if the device answers
    pub(crate) fn start_probe(&mut self) {
        let address = match DeviceAddress::parse(&self.address_input) {
            Ok(address) => address,
            Err(e) => {
                self.log(ActivityKind::Probe, false, e.to_string());
                self.feedback.insert(DeviceOp::Probe, Feedback::new(false));
                return;
            }
        };

        self.in_flight.insert(DeviceOp::Probe);
        self.status = format!("Testing {}...", address);

        let client = self.client.clone();
        let timeout = self.config.probe_timeout();
        self.spawn_device_task(async move {
            let reachable = client.probe_reachable(&address, timeout).await;
            DeviceEvent::ProbeFinished { address, reachable }
        });
    }

    /// Serialize the grid and post it. Blocked while a send is already running.
    pub(crate) fn start_send(&mut self) {
        if self.is_in_flight(DeviceOp::Send) {
            return;
        }

        let Some(address) = self.client.address() else {
            self.log(ActivityKind::Send, false, "Set the device address first");
            self.feedback.insert(DeviceOp::Send, Feedback::new(false));
            self.show_settings = true;
            return;
        };

        let format = self.config.payload_format;
        let payload = match build_payload(self.session.grid(), format) {
            Ok(payload) => payload,
            Err(e) => {
                // Nothing is sent for a grid that fails validation
                self.log(ActivityKind::Send, false, format!("Not sent: {}", e));
                self.feedback.insert(DeviceOp::Send, Feedback::new(false));
                return;
            }
        };

        self.in_flight.insert(DeviceOp::Send);
        self.status = format!("Sending {} to {}...", format.label(), address);

        let client = self.client.clone();
        self.spawn_device_task(async move {
            let result = client
                .push_grid(&address, &payload)
                .await
                .map_err(|e| e.to_string());
            DeviceEvent::SendFinished(result)
        });
    }

    pub(crate) fn start_push_magnets(&mut self) {
        if self.is_in_flight(DeviceOp::PushMagnets) {
            return;
        }

        let Some(address) = self.client.address() else {
            self.log(ActivityKind::Push, false, "Set the device address first");
            self.feedback.insert(DeviceOp::PushMagnets, Feedback::new(false));
            self.show_settings = true;
            return;
        };

        self.in_flight.insert(DeviceOp::PushMagnets);
        self.status = format!("Pushing magnets on {}...", address);

        let client = self.client.clone();
        self.spawn_device_task(async move {
            let result = client
                .push_action(&address, PUSH_MAGNETS_ENDPOINT)
                .await
                .map_err(|e| e.to_string());
            DeviceEvent::PushFinished(result)
        });
    }

    pub(crate) fn clear_grid(&mut self) {
        self.session.clear();
        self.status = "Grid cleared".to_string();
    }

    pub(crate) fn set_grid_size(&mut self, size: usize) {
        if size == self.config.grid_size {
            return;
        }
        self.session.resize(size);
        self.config.grid_size = size;
        self.save_config();
        self.log(ActivityKind::Config, true, format!("Grid size set to {}x{}", size, size));
    }

    pub(crate) fn set_payload_format(&mut self, format: PayloadFormat) {
        if format == self.config.payload_format {
            return;
        }
        self.config.payload_format = format;
        self.save_config();
    }

    pub(crate) fn set_live_updates(&mut self, enabled: bool) {
        self.config.live_updates = enabled;
        self.save_config();
        if enabled {
            if let Some(address) = self.client.address() {
                self.open_live_channel_if_enabled(&address);
            }
        } else {
            self.client.close_live_channel();
        }
    }

    pub(crate) fn check_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                DeviceEvent::ProbeFinished { address, reachable } => {
                    self.in_flight.remove(&DeviceOp::Probe);
                    self.feedback.insert(DeviceOp::Probe, Feedback::new(reachable));
                    if reachable {
                        self.log(ActivityKind::Probe, true, format!("{} is reachable", address));
                        self.address_input = address.to_string();
                        self.save_address();
                    } else {
                        self.log(ActivityKind::Probe, false, format!("{} is not reachable", address));
                    }
                }
                DeviceEvent::SendFinished(result) => {
                    self.in_flight.remove(&DeviceOp::Send);
                    self.feedback.insert(DeviceOp::Send, Feedback::new(result.is_ok()));
                    match result {
                        Ok(receipt) => {
                            let message = match receipt.device_status {
                                Some(status) => format!("Grid sent to {} (device: {})", receipt.url, status),
                                None => format!("Grid sent to {}", receipt.url),
                            };
                            self.log(ActivityKind::Send, true, message);
                        }
                        Err(e) => self.log(ActivityKind::Send, false, e),
                    }
                }
                DeviceEvent::PushFinished(result) => {
                    self.in_flight.remove(&DeviceOp::PushMagnets);
                    self.feedback.insert(DeviceOp::PushMagnets, Feedback::new(result.is_ok()));
                    match result {
                        Ok(receipt) => self.log(ActivityKind::Push, true, format!("Magnets pushed ({})", receipt.url)),
                        Err(e) => self.log(ActivityKind::Push, false, e),
                    }
                }
            }
        }
    }
}
