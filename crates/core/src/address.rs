//! Device address parsing and candidate URL lists

use crate::error::{MagnetBoardError, Result};
use std::fmt;
use std::str::FromStr;

/// Host plus an optional explicit port, as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: Option<u16>,
}

impl DeviceAddress {
    /// Accepts `host`, `host:port`, and tolerates a leading `http://` or `ws://`
    /// and a trailing `/`. Empty input is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let mut text = input.trim();
        for scheme in ["http://", "https://", "ws://", "wss://"] {
            if let Some(rest) = text.strip_prefix(scheme) {
                text = rest;
                break;
            }
        }
        let text = text.trim_end_matches('/');

        if text.is_empty() {
            return Err(MagnetBoardError::InvalidAddress("address is empty".to_string()));
        }
        if text.contains(char::is_whitespace) || text.contains('/') {
            return Err(MagnetBoardError::InvalidAddress(input.trim().to_string()));
        }

        let (host, port) = match text.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| MagnetBoardError::InvalidAddress(format!("bad port in {}", text)))?;
                (host, Some(port))
            }
            None => (text, None),
        };

        if host.is_empty() || host.contains(':') {
            return Err(MagnetBoardError::InvalidAddress(text.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Base URLs to try in order: the explicit port alone, otherwise the
    /// default port then the fallback port.
    pub fn candidate_base_urls(&self, default_port: u16, fallback_port: u16) -> Vec<String> {
        match self.port {
            Some(port) => vec![format!("http://{}:{}", self.host, port)],
            None => {
                let mut urls = vec![format!("http://{}:{}", self.host, default_port)];
                if fallback_port != default_port {
                    urls.push(format!("http://{}:{}", self.host, fallback_port));
                }
                urls
            }
        }
    }

    /// Full URLs for one endpoint path, in the same order
    pub fn candidate_urls(&self, path: &str, default_port: u16, fallback_port: u16) -> Vec<String> {
        self.candidate_base_urls(default_port, fallback_port)
            .into_iter()
            .map(|base| format!("{}{}", base, path))
            .collect()
    }

    /// The live channel always uses its own fixed port
    pub fn live_channel_url(&self, live_port: u16) -> String {
        format!("ws://{}:{}", self.host, live_port)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

impl FromStr for DeviceAddress {
    type Err = MagnetBoardError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceAddress::parse(s)
    }
}
