//! HTTP and live-channel client for the magnet board device
//!
//! Device endpoints:
//! - `GET /status` reachability probe
//! - `POST /grid`, `POST /grid-simple` full grid payloads
//! - `POST /push-magnets` physical push trigger
//! - `ws://host:81` per-cell updates
//!
//! Without an explicit port every request goes to the default port first and the
//! fallback port second, stopping at the first 2xx.

use crate::config::Config;
use crate::live_channel::{LiveChannel, LiveState};
use magnetboard_core::{
    CellUpdate, DeliveryFailure, DeviceAddress, DeviceStatus, GridPayload, LiveMessage,
    MagnetBoardError, Result,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

pub const PUSH_MAGNETS_ENDPOINT: &str = "/push-magnets";
const STATUS_ENDPOINT: &str = "/status";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub default_port: u16,
    pub fallback_port: u16,
    pub live_port: u16,
}

impl From<&Config> for ClientSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_port: config.default_port,
            fallback_port: config.fallback_port,
            live_port: config.live_port,
        }
    }
}

/// What the device said when a post went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub url: String,
    pub status: u16,
    pub device_status: Option<String>,
}

#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    settings: ClientSettings,
    address: Arc<RwLock<Option<DeviceAddress>>>,
    config_path: Option<PathBuf>,
    live: Arc<Mutex<Option<LiveChannel>>>,
}

impl DeviceClient {
    /// `config_path` is where address edits are persisted; `None` keeps them in memory
    pub fn new(settings: ClientSettings, config_path: Option<PathBuf>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MagnetBoardError::Connectivity(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            settings,
            address: Arc::new(RwLock::new(None)),
            config_path,
            live: Arc::new(Mutex::new(None)),
        })
    }

    /// The current target, as restored from config or last set
    pub fn address(&self) -> Option<DeviceAddress> {
        self.address.read().ok().and_then(|a| a.clone())
    }

    /// Adopt an address read at startup without writing it back
    pub fn restore_address(&self, address: Option<DeviceAddress>) {
        if let Ok(mut current) = self.address.write() {
            *current = address;
        }
    }

    /// Parse, persist and adopt a new address. Empty input or a failed config
    /// write leaves the current address untouched.
    pub fn set_address(&self, input: &str) -> Result<DeviceAddress> {
        let address = DeviceAddress::parse(input)?;
        self.persist_address(&address)?;
        self.restore_address(Some(address.clone()));
        tracing::info!("Device address set to {}", address);
        Ok(address)
    }

    fn persist_address(&self, address: &DeviceAddress) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let mut config = Config::load_from(path);
        config.device_address = address.to_string();
        config.save_to(path)
    }

    /// GET `/status` under one deadline shared by every candidate and the body read.
    /// Any 2xx counts, whatever the body says; timeouts and transport errors count
    /// as unreachable.
    pub async fn probe_reachable(&self, address: &DeviceAddress, timeout: Duration) -> bool {
        let urls = address.candidate_urls(
            STATUS_ENDPOINT,
            self.settings.default_port,
            self.settings.fallback_port,
        );
        let deadline = tokio::time::Instant::now() + timeout;

        let result = first_success(&urls, |url| {
            let http = self.http.clone();
            async move {
                tracing::debug!("Probing {}", url);
                let response = match tokio::time::timeout_at(deadline, http.get(&url).send()).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => return Err(transport_failure(&url, &e)),
                    Err(_) => {
                        return Err(DeliveryFailure::Transport {
                            url,
                            message: format!("timed out after {} ms", timeout.as_millis()),
                        })
                    }
                };

                let status = response.status();
                if !status.is_success() {
                    return Err(DeliveryFailure::Http {
                        url,
                        status: status.as_u16(),
                        body: String::new(),
                    });
                }

                // The body is informational only
                match tokio::time::timeout_at(deadline, response.json::<DeviceStatus>()).await {
                    Ok(Ok(body)) if !body.is_ok() => {
                        tracing::warn!("{} reachable but reports status {:?}", url, body.status);
                    }
                    Ok(Ok(_)) => {}
                    _ => tracing::debug!("{} reachable, body is not a status object", url),
                }
                Ok(url)
            }
        })
        .await;

        match result {
            Ok(url) => {
                tracing::info!("Device reachable at {}", url);
                true
            }
            Err(failure) => {
                tracing::warn!("Device {} unreachable: {}", address, failure);
                false
            }
        }
    }

    /// POST a serialized grid to the endpoint its format belongs to
    pub async fn push_grid(&self, address: &DeviceAddress, payload: &GridPayload) -> Result<PushReceipt> {
        let urls = address.candidate_urls(
            payload.endpoint(),
            self.settings.default_port,
            self.settings.fallback_port,
        );

        first_success(&urls, |url| {
            let request = self.http.post(&url).json(payload);
            post(request, url)
        })
        .await
        .map_err(MagnetBoardError::DeliveryFailed)
    }

    /// POST with no body to a trigger endpoint such as `/push-magnets`
    pub async fn push_action(&self, address: &DeviceAddress, endpoint: &str) -> Result<PushReceipt> {
        let urls = address.candidate_urls(
            endpoint,
            self.settings.default_port,
            self.settings.fallback_port,
        );

        first_success(&urls, |url| {
            let request = self.http.post(&url);
            post(request, url)
        })
        .await
        .map_err(MagnetBoardError::DeliveryFailed)
    }

    /// Open the live channel, reusing one that is open or connecting to the same
    /// address. Outside a tokio runtime the channel stays unset.
    pub fn open_live_channel(&self, address: &DeviceAddress) {
        let url = address.live_channel_url(self.settings.live_port);
        let Ok(mut live) = self.live.lock() else {
            return;
        };

        if let Some(channel) = live.as_ref() {
            if channel.url() == url && channel.is_active() {
                tracing::debug!("Reusing live channel to {}", url);
                return;
            }
        }

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::error!("No async runtime, live channel to {} not opened", url);
            *live = None;
            return;
        }
        *live = Some(LiveChannel::open(&url));
    }

    pub fn close_live_channel(&self) {
        if let Ok(mut live) = self.live.lock() {
            if live.take().is_some() {
                tracing::info!("Live channel closed");
            }
        }
    }

    pub fn live_state(&self) -> Option<LiveState> {
        self.live
            .lock()
            .ok()
            .and_then(|live| live.as_ref().map(LiveChannel::state))
    }

    /// Forward one painted cell. Returns `false` when there is no open channel,
    /// in which case the update is simply dropped.
    pub fn send_cell_update(&self, update: CellUpdate) -> bool {
        let Ok(live) = self.live.lock() else {
            return false;
        };
        match live.as_ref() {
            Some(channel) => channel.send(LiveMessage::from(update)),
            None => {
                tracing::debug!("No live channel, dropping update for ({}, {})", update.row, update.col);
                false
            }
        }
    }
}

/// Try each URL in order and stop at the first success, keeping the last failure
async fn first_success<T, F, Fut>(urls: &[String], mut attempt: F) -> std::result::Result<T, DeliveryFailure>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = std::result::Result<T, DeliveryFailure>>,
{
    let mut last = DeliveryFailure::NoCandidates;
    for (i, url) in urls.iter().enumerate() {
        match attempt(url.clone()).await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                if i + 1 < urls.len() {
                    tracing::warn!("{}; trying next candidate", failure);
                }
                last = failure;
            }
        }
    }
    Err(last)
}

async fn post(request: reqwest::RequestBuilder, url: String) -> std::result::Result<PushReceipt, DeliveryFailure> {
    tracing::debug!("POST {}", url);
    let response = request.send().await.map_err(|e| transport_failure(&url, &e))?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(DeliveryFailure::Http {
            url,
            status: status.as_u16(),
            body,
        });
    }

    let device_status = serde_json::from_str::<DeviceStatus>(&body)
        .ok()
        .and_then(|s| s.status);
    tracing::info!("POST {} -> {}", url, status);
    Ok(PushReceipt {
        url,
        status: status.as_u16(),
        device_status,
    })
}

fn transport_failure(url: &str, error: &reqwest::Error) -> DeliveryFailure {
    let message = if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_timeout() {
        "timed out".to_string()
    } else {
        error.to_string()
    };
    DeliveryFailure::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_channel::tests::spawn_ws_sink;
    use axum::{http::StatusCode, routing::{get, post}, Json, Router};
    use magnetboard_core::{build_payload, Cell, Grid, PayloadFormat, Rgb};
    use serde_json::{json, Value};
    use std::time::Instant;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    async fn serve(app: Router) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    /// A port nothing listens on
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn client_with_live_port(default_port: u16, fallback_port: u16, live_port: u16) -> DeviceClient {
        DeviceClient::new(
            ClientSettings {
                default_port,
                fallback_port,
                live_port,
            },
            None,
        )
        .unwrap()
    }

    fn client(default_port: u16, fallback_port: u16) -> DeviceClient {
        client_with_live_port(default_port, fallback_port, 81)
    }

    fn localhost() -> DeviceAddress {
        DeviceAddress::parse("127.0.0.1").unwrap()
    }

    fn sample_grid() -> Grid {
        let mut grid = Grid::new(5);
        grid.set(0, 0, Cell::Filled(Rgb::new(0xFF, 0, 0)));
        grid.set(4, 4, Cell::Filled(Rgb::new(0, 0, 0xFF)));
        grid
    }

    /// Device double recording every grid body it receives
    fn device(tx: mpsc::UnboundedSender<(String, Value)>) -> Router {
        let grid_tx = tx.clone();
        let simple_tx = tx;
        Router::new()
            .route("/status", get(|| async { Json(json!({"status": "ok"})) }))
            .route(
                "/grid",
                post(move |Json(body): Json<Value>| {
                    let tx = grid_tx.clone();
                    async move {
                        let _ = tx.send(("/grid".to_string(), body));
                        Json(json!({"status": "ok"}))
                    }
                }),
            )
            .route(
                "/grid-simple",
                post(move |Json(body): Json<Value>| {
                    let tx = simple_tx.clone();
                    async move {
                        let _ = tx.send(("/grid-simple".to_string(), body));
                        StatusCode::OK
                    }
                }),
            )
            .route("/push-magnets", post(|| async { StatusCode::OK }))
    }

    #[tokio::test]
    async fn probe_returns_false_quickly_without_listener() {
        let port = closed_port().await;
        let client = client(port, port);
        let started = Instant::now();

        assert!(!client.probe_reachable(&localhost(), Duration::from_millis(2000)).await);
        assert!(started.elapsed() < Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn probe_times_out_on_silent_listener() {
        // Accepts the TCP connection but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = DeviceAddress::parse(&format!("127.0.0.1:{}", port)).unwrap();
        let client = client(80, 8080);
        let started = Instant::now();

        assert!(!client.probe_reachable(&address, Duration::from_millis(200)).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(1500));
        drop(listener);
    }

    #[tokio::test]
    async fn probe_deadline_covers_every_candidate_port() {
        // Default and fallback both accept TCP and never answer
        let primary = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let fallback = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = client(
            primary.local_addr().unwrap().port(),
            fallback.local_addr().unwrap().port(),
        );
        let started = Instant::now();

        assert!(!client.probe_reachable(&localhost(), Duration::from_millis(400)).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < Duration::from_millis(700), "probe took {:?}", elapsed);
        drop((primary, fallback));
    }

    #[tokio::test]
    async fn probe_deadline_covers_a_stalled_body() {
        // Headers arrive at once, the body never finishes
        let app = Router::new().route(
            "/status",
            get(|| async {
                let body = axum::body::Body::from_stream(futures_util::stream::pending::<
                    std::result::Result<Vec<u8>, std::io::Error>,
                >());
                axum::response::Response::builder()
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap()
            }),
        );
        let port = serve(app).await;
        let address = DeviceAddress::parse(&format!("127.0.0.1:{}", port)).unwrap();
        let started = Instant::now();

        // Headers were a 2xx, so the device still counts as reachable
        assert!(client(80, 8080).probe_reachable(&address, Duration::from_millis(300)).await);
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn probe_falls_back_and_ignores_body() {
        let app = Router::new().route("/status", get(|| async { "not json" }));
        let port = serve(app).await;
        let client = client(closed_port().await, port);

        assert!(client.probe_reachable(&localhost(), Duration::from_millis(2000)).await);
    }

    #[tokio::test]
    async fn probe_treats_offline_status_as_reachable() {
        let app = Router::new().route("/status", get(|| async { Json(json!({"status": "offline"})) }));
        let port = serve(app).await;
        let address = DeviceAddress::parse(&format!("127.0.0.1:{}", port)).unwrap();

        assert!(client(80, 8080).probe_reachable(&address, Duration::from_millis(2000)).await);
    }

    #[tokio::test]
    async fn push_grid_uses_fallback_when_primary_refuses() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let port = serve(device(tx)).await;
        let client = client(closed_port().await, port);

        let payload = build_payload(&sample_grid(), PayloadFormat::Full).unwrap();
        let receipt = client.push_grid(&localhost(), &payload).await.unwrap();
        assert_eq!(receipt.url, format!("http://127.0.0.1:{}/grid", port));
        assert_eq!(receipt.device_status.as_deref(), Some("ok"));

        let (path, body) = rx.recv().await.unwrap();
        assert_eq!(path, "/grid");
        assert_eq!(body["grid"][0][0], json!("#FF0000"));
        assert_eq!(body["grid"][4][4], json!("#0000FF"));
        assert_eq!(body["grid"][2][2], Value::Null);
    }

    #[tokio::test]
    async fn binary_compact_goes_to_grid_simple() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let port = serve(device(tx)).await;
        let address = DeviceAddress::parse(&format!("127.0.0.1:{}", port)).unwrap();

        let payload = build_payload(&sample_grid(), PayloadFormat::BinaryCompact).unwrap();
        let receipt = client(80, 8080).push_grid(&address, &payload).await.unwrap();
        assert_eq!(receipt.device_status, None);

        let (path, body) = rx.recv().await.unwrap();
        assert_eq!(path, "/grid-simple");
        assert_eq!(body, json!({"compact": "1000000000000000000000001"}));
    }

    #[tokio::test]
    async fn exhausted_candidates_carry_last_http_error() {
        let app = Router::new().route(
            "/grid",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "grid rejected") }),
        );
        let port = serve(app).await;
        let client = client(closed_port().await, port);

        let payload = build_payload(&sample_grid(), PayloadFormat::PaletteCompact).unwrap();
        match client.push_grid(&localhost(), &payload).await {
            Err(MagnetBoardError::DeliveryFailed(DeliveryFailure::Http { status, body, .. })) => {
                assert_eq!(status, 500);
                assert_eq!(body, "grid rejected");
            }
            other => panic!("expected HTTP delivery failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exhausted_candidates_carry_transport_error() {
        let client = client(closed_port().await, closed_port().await);
        let payload = build_payload(&sample_grid(), PayloadFormat::BinaryCompact).unwrap();

        let err = client.push_grid(&localhost(), &payload).await.unwrap_err();
        assert!(matches!(err, MagnetBoardError::DeliveryFailed(DeliveryFailure::Transport { .. })));
    }

    #[tokio::test]
    async fn push_action_surfaces_status() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let port = serve(device(tx)).await;
        let address = DeviceAddress::parse(&format!("127.0.0.1:{}", port)).unwrap();
        let client = client(80, 8080);

        let receipt = client.push_action(&address, PUSH_MAGNETS_ENDPOINT).await.unwrap();
        assert_eq!(receipt.status, 200);

        let err = client.push_action(&address, "/missing").await.unwrap_err();
        match err {
            MagnetBoardError::DeliveryFailed(failure) => assert_eq!(failure.status(), Some(404)),
            other => panic!("expected delivery failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn set_address_rejects_empty_and_keeps_previous() {
        let client = client(80, 8080);
        client.set_address("192.168.4.1").unwrap();
        assert!(client.set_address("   ").is_err());
        assert_eq!(client.address().map(|a| a.to_string()), Some("192.168.4.1".to_string()));
    }

    #[tokio::test]
    async fn set_address_keeps_previous_when_config_write_fails() {
        let dir = std::env::temp_dir().join(format!("magnetboard-missing-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let client = DeviceClient::new(
            ClientSettings::from(&Config::default()),
            Some(dir.join("config.toml")),
        )
        .unwrap();
        client.restore_address(Some(DeviceAddress::parse("192.168.4.1").unwrap()));

        assert!(matches!(client.set_address("10.0.0.9"), Err(MagnetBoardError::Config(_))));
        assert_eq!(client.address().map(|a| a.to_string()), Some("192.168.4.1".to_string()));
    }

    #[tokio::test]
    async fn set_address_persists_to_config() {
        let path = std::env::temp_dir().join(format!("magnetboard-client-{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let client = DeviceClient::new(ClientSettings::from(&Config::default()), Some(path.clone())).unwrap();

        client.set_address("esp32.local:8081").unwrap();
        assert_eq!(Config::load_from(&path).device_address, "esp32.local:8081");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn cell_updates_need_an_open_channel() {
        let (port, mut received) = spawn_ws_sink().await;
        let client = client_with_live_port(80, 8080, port);
        let update = CellUpdate { row: 0, col: 0, cell: Cell::Filled(Rgb::WHITE) };

        // Nothing open yet
        assert!(!client.send_cell_update(update));

        client.open_live_channel(&localhost());
        client.open_live_channel(&localhost());
        for _ in 0..100 {
            if client.live_state() == Some(LiveState::Open) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(client.send_cell_update(update));

        let text = tokio::time::timeout(Duration::from_secs(2), received.recv())
            .await
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"type": "cell", "r": 0, "c": 0, "color": "#FFFFFF"}));

        client.close_live_channel();
        assert_eq!(client.live_state(), None);
        assert!(!client.send_cell_update(update));
    }
}
