use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::classification::RuleSet;

const ONE_WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Where uncached roster slices are fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RosterSourceSettings {
    Files {
        dir: PathBuf,
        default_file: PathBuf,
    },
    Http {
        base_url: String,
        default_path: String,
        timeout_secs: u64,
    },
}

impl Default for RosterSourceSettings {
    fn default() -> Self {
        Self::Files {
            dir: PathBuf::from("public/employees"),
            default_file: PathBuf::from("../amazonians.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file backing the durable cache. Relative paths resolve against
    /// the settings file's directory.
    pub database_file: PathBuf,
    pub rule_set: RuleSet,
    pub roster_source: RosterSourceSettings,
    /// Part of every roster cache key; bump it to drop cached slices.
    pub roster_schema_version: u32,
    pub trending_window_ms: i64,
    pub ranking_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_file: PathBuf::from("rosterrank.sqlite3"),
            rule_set: RuleSet::default(),
            roster_source: RosterSourceSettings::default(),
            roster_schema_version: 6,
            trending_window_ms: ONE_WEEK_MS,
            ranking_size: 3,
        }
    }
}

impl Settings {
    /// `path` resolved against `base` unless it is already absolute.
    pub fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file gives the defaults, and so
    /// does a file that no longer parses.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings at {}: {err}",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths in the settings are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get(&self) -> Settings {
        self.read().clone()
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: Settings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
