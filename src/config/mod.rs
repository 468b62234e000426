//! On-disk layout: where the registry and settings live, and the JSON
//! read/write helpers both stores share.

pub mod settings;

pub use settings::{Settings, DEFAULT_ADMIN_ADDR, DEFAULT_HTTP_PORT};

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Overrides the config directory when set to a non-empty value.
pub const CONFIG_DIR_ENV: &str = "LNS_CONFIG_DIR";

const CONFIG_DIR_NAME: &str = ".lns";
const PROXY_GLOBAL_CONFIG_NAME: &str = "Caddyfile";

/// Location of the lns state directory and the files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// `$LNS_CONFIG_DIR`, else `~/.lns`, else `.lns` relative to the working
    /// directory.
    pub fn resolve() -> Self {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Self::at(dir);
        }
        match dirs::home_dir() {
            Some(home) => Self::at(home.join(CONFIG_DIR_NAME)),
            None => Self::at(CONFIG_DIR_NAME),
        }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join("registry.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Per-project proxy config lives here; written by the proxy layer, not by lns.
    pub fn proxy_config_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Top-level config file of the reverse proxy, which imports the
    /// per-project files. Also owned by the proxy layer.
    pub fn proxy_global_config_path(&self) -> PathBuf {
        self.root.join(PROXY_GLOBAL_CONFIG_NAME)
    }

    pub fn ensure(&self) -> Result<()> {
        create_dir_all(&self.root)?;
        create_dir_all(&self.proxy_config_dir())
    }
}

pub fn config_dir() -> PathBuf {
    ConfigDir::resolve().root
}

pub fn registry_path() -> PathBuf {
    ConfigDir::resolve().registry_path()
}

pub fn settings_path() -> PathBuf {
    ConfigDir::resolve().settings_path()
}

pub fn proxy_config_dir() -> PathBuf {
    ConfigDir::resolve().proxy_config_dir()
}

pub fn proxy_global_config_path() -> PathBuf {
    ConfigDir::resolve().proxy_global_config_path()
}

pub fn ensure_config_dirs() -> Result<()> {
    ConfigDir::resolve().ensure()
}

pub(crate) fn create_dir_all(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::Filesystem {
        path: dir.to_path_buf(),
        source,
    })
}

/// Reads and decodes a JSON file. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Filesystem {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Pretty-prints `value` to `path`, creating the parent directory first.
///
/// Writes to a sibling temp file, syncs it, then renames it over `path`, so
/// a crash mid-write leaves the previous contents intact. The temp file is
/// removed again if any step fails.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");

    let result = write_then_rename(&temp_path, path, &contents);
    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %temp_path.display(), "Failed to remove temp file: {}", e);
            }
        }
    }
    result
}

fn write_then_rename(temp_path: &Path, path: &Path, contents: &str) -> Result<()> {
    let fs_err = |source| Error::Filesystem {
        path: temp_path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(temp_path).map_err(fs_err)?;
    file.write_all(contents.as_bytes()).map_err(fs_err)?;
    file.write_all(b"\n").map_err(fs_err)?;
    file.sync_all().map_err(fs_err)?;
    drop(file);

    fs::rename(temp_path, path).map_err(|source| Error::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
