//! Main application module

mod state;
mod panels;

use crate::config::Config;
use crate::device_client::{ClientSettings, DeviceClient};
use crate::ui::{DeviceEvent, DeviceOp, Feedback};
use magnetboard_core::{ActivityLog, PaintSession, DEFAULT_PALETTE};

use eframe::egui;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

pub struct MagnetBoardApp {
    pub(crate) ctx: egui::Context,
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) session: PaintSession,
    pub(crate) client: DeviceClient,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) events_tx: Sender<DeviceEvent>,
    pub(crate) events_rx: Receiver<DeviceEvent>,
    // Operations waiting on the device
    pub(crate) in_flight: HashSet<DeviceOp>,
    // Last outcome per operation, cleared after FEEDBACK_DURATION
    pub(crate) feedback: HashMap<DeviceOp, Feedback>,
    pub(crate) status: String,
    pub(crate) activity: ActivityLog,
    // Settings window
    pub(crate) address_input: String,
    pub(crate) show_settings: bool,
}

impl MagnetBoardApp {
    pub fn new(ctx: egui::Context) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_path = Config::path();
        let config = Config::load_from(&config_path);
        let runtime = tokio::runtime::Runtime::new()?;

        let client = DeviceClient::new(ClientSettings::from(&config), Some(config_path.clone()))?;
        let address = config.device_address();
        client.restore_address(address.clone());

        let (events_tx, events_rx) = channel();
        let session = PaintSession::new(config.grid_size, DEFAULT_PALETTE[0].0);

        let status = match &address {
            Some(addr) => format!("Device: {}", addr),
            None => "Set the device address in Settings".to_string(),
        };

        let app = Self {
            ctx,
            address_input: config.device_address.clone(),
            // Show settings on first run if no device is configured
            show_settings: address.is_none(),
            config,
            config_path,
            session,
            client,
            runtime,
            events_tx,
            events_rx,
            in_flight: HashSet::new(),
            feedback: HashMap::new(),
            status,
            activity: ActivityLog::default(),
        };

        if let Some(addr) = &address {
            app.open_live_channel_if_enabled(addr);
        }

        Ok(app)
    }
}

impl eframe::App for MagnetBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_events();
        self.cleanup_expired_feedback();

        // Keep repainting while something is pending or a button is showing feedback
        if !self.in_flight.is_empty() || !self.feedback.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Render panels
        self.render_top_panel(ctx);
        self.render_activity_panel(ctx);
        self.render_palette_panel(ctx);
        self.render_canvas(ctx);
    }
}
