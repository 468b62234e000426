use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HTTP_PORT: u16 = 8888;
pub const DEFAULT_ADMIN_ADDR: &str = "127.0.0.1:20190";

/// Listener settings for the reverse-proxy layer.
///
/// Independent of the registry: nothing here affects port allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub http_port: u16,
    pub admin_addr: String,
}

/// Settings as found on disk, before validation. Ports are read wide so an
/// out-of-range value resets to the default instead of failing to decode.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    http_port: Option<i64>,
    #[serde(default)]
    admin_addr: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            admin_addr: DEFAULT_ADMIN_ADDR.to_string(),
        }
    }
}

impl Settings {
    /// Loads from the default settings path.
    pub fn load() -> Result<Self> {
        Self::load_from(&super::settings_path())
    }

    /// Loads settings from `path`. A missing file yields the defaults; a
    /// present file has invalid values replaced by their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match super::read_json::<RawSettings>(path)? {
            Some(raw) => Ok(Self::from_raw(raw)),
            None => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Saves to the default settings path, creating the config directories.
    pub fn save(&self) -> Result<()> {
        super::ensure_config_dirs()?;
        self.save_to(&super::settings_path())
    }

    /// Normalizes and writes the settings to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let normalized = self.clone().normalized();
        super::write_json_atomic(path, &normalized)?;
        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Replaces a zero port or an unparseable admin address with the defaults.
    pub fn normalized(mut self) -> Self {
        if self.http_port == 0 {
            self.http_port = DEFAULT_HTTP_PORT;
        }
        if !is_valid_admin_addr(&self.admin_addr) {
            self.admin_addr = DEFAULT_ADMIN_ADDR.to_string();
        }
        self
    }

    fn from_raw(raw: RawSettings) -> Self {
        let http_port = raw
            .http_port
            .and_then(|port| u16::try_from(port).ok())
            .filter(|port| *port >= 1)
            .unwrap_or_else(|| {
                if let Some(port) = raw.http_port {
                    tracing::warn!(port, "http_port out of range, using {}", DEFAULT_HTTP_PORT);
                }
                DEFAULT_HTTP_PORT
            });

        Self {
            http_port,
            admin_addr: raw.admin_addr.unwrap_or_default(),
        }
        .normalized()
    }
}

fn is_valid_admin_addr(addr: &str) -> bool {
    !addr.is_empty() && split_host_port(addr).is_some()
}

/// Splits `host:port`, accepting `[v6-host]:port`, with the same rules the
/// proxy applies to its admin address: the port may be any string, an
/// unbracketed host may not contain `:`, and brackets may only wrap the host.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let colon = addr.rfind(':')?;

    // `open` and `close` mark where stray brackets start being rejected.
    let (host, open, close) = if addr.starts_with('[') {
        let end = addr.find(']')?;
        // "]" must be followed directly by the final ":".
        if end + 1 != colon {
            return None;
        }
        (&addr[1..end], 1, end + 1)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return None;
        }
        (host, 0, 0)
    };

    if addr[open..].contains('[') || addr[close..].contains(']') {
        return None;
    }

    Some((host, &addr[colon + 1..]))
}
