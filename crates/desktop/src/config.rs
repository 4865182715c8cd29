//! Configuration management using config.toml

use magnetboard_core::{DeviceAddress, MagnetBoardError, PayloadFormat, Result, MAX_GRID_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "MAGNETBOARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device host, optionally with `:port`
    #[serde(default)]
    pub device_address: String,

    /// Cells per side
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    #[serde(default)]
    pub payload_format: PayloadFormat,

    /// Tried first when the address has no port
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Tried second when the address has no port
    #[serde(default = "default_fallback_port")]
    pub fallback_port: u16,

    /// WebSocket port for per-cell updates
    #[serde(default = "default_live_port")]
    pub live_port: u16,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Stream each painted cell over the live channel
    #[serde(default = "default_true")]
    pub live_updates: bool,
}

fn default_grid_size() -> usize { 16 }
fn default_port() -> u16 { 80 }
fn default_fallback_port() -> u16 { 8080 }
fn default_live_port() -> u16 { 81 }
fn default_probe_timeout_ms() -> u64 { 2000 }
fn default_true() -> bool { true }

impl Default for Config {
    fn default() -> Self {
        Self {
            device_address: String::new(),
            grid_size: default_grid_size(),
            payload_format: PayloadFormat::default(),
            default_port: default_port(),
            fallback_port: default_fallback_port(),
            live_port: default_live_port(),
            probe_timeout_ms: default_probe_timeout_ms(),
            live_updates: true,
        }
    }
}

impl Config {
    /// Where the config lives: `$MAGNETBOARD_CONFIG` or `./config.toml`
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
    }

    /// Load config from file, creating default if it doesn't exist
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => return config.sanitized(),
                    Err(e) => {
                        tracing::warn!("Error parsing {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Error reading {}: {}", path.display(), e);
                }
            }
            // Don't clobber a file the user may want to fix by hand
            return Config::default();
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not create {}: {}", path.display(), e);
        }
        config
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| MagnetBoardError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| MagnetBoardError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        if !(1..=MAX_GRID_SIZE).contains(&self.grid_size) {
            tracing::warn!("grid_size {} out of range, using {}", self.grid_size, default_grid_size());
            self.grid_size = default_grid_size();
        }
        self
    }

    /// The stored address, if one is set and parses
    pub fn device_address(&self) -> Option<DeviceAddress> {
        if self.device_address.trim().is_empty() {
            return None;
        }
        DeviceAddress::parse(&self.device_address).ok()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("magnetboard-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn missing_file_writes_defaults() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);

        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn round_trips_through_toml() {
        let path = temp_path("roundtrip");
        let config = Config {
            device_address: "192.168.4.1:8081".to_string(),
            grid_size: 5,
            payload_format: PayloadFormat::PaletteCompact,
            live_updates: false,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.device_address().map(|a| a.port()), Some(Some(8081)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = toml::from_str("device_address = \"esp32.local\"\n").unwrap();
        assert_eq!(config.grid_size, 16);
        assert_eq!(config.default_port, 80);
        assert_eq!(config.fallback_port, 8080);
        assert_eq!(config.live_port, 81);
        assert_eq!(config.probe_timeout(), Duration::from_millis(2000));
        assert_eq!(config.payload_format, PayloadFormat::BinaryCompact);
        assert!(config.live_updates);
    }

    #[test]
    fn out_of_range_grid_size_is_reset() {
        let path = temp_path("badsize");
        fs::write(&path, "grid_size = 500\n").unwrap();
        assert_eq!(Config::load_from(&path).grid_size, 16);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_address_is_absent() {
        assert_eq!(Config::default().device_address(), None);
    }
}
