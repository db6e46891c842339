use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::analysis::AnalysisConfig;
use crate::log_warn;

const ENABLE_LOGS: bool = true;

pub const DATA_DIR_ENV: &str = "GLUCOTRACK_DATA_DIR";
pub const ADDR_ENV: &str = "GLUCOTRACK_ADDR";
const SETTINGS_FILE: &str = "settings.json";
const DATABASE_FILE: &str = "glucotrack.sqlite3";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".into(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.bind_addr))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub analysis: AnalysisConfig,
    pub server: ServerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Load `path`, writing defaults when the file does not exist yet.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("Ignoring unreadable settings at {}: {err}", path.display());
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if !store.path.exists() {
            store.persist(&store.snapshot())?;
        }
        Ok(store)
    }

    /// Settings file inside `data_dir`, with `GLUCOTRACK_ADDR` applied on top.
    pub fn open_in(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let store = Self::new(data_dir.join(SETTINGS_FILE))?;
        if let Ok(addr) = env::var(ADDR_ENV) {
            store.write().server.bind_addr = addr;
        }
        store
            .analysis()
            .validate()
            .context("Invalid analysis settings")?;
        Ok(store)
    }

    pub fn snapshot(&self) -> AppSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.snapshot().analysis
    }

    pub fn server(&self) -> ServerSettings {
        self.snapshot().server
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AppSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

pub fn data_dir() -> PathBuf {
    env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}
