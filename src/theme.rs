//! Display theme preference / 显示主题
//!
//! A process-wide setting: written only by the theme toggle, read by the
//! renderer. Changes are pushed to subscribers. The choice survives restarts
//! through a small JSON key-value file.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{LexiconError, Result};

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(LexiconError::Config(format!("unknown theme: {:?}", other))),
        }
    }
}

type Listener = Arc<dyn Fn(Theme) + Send + Sync>;

/// Theme holder with change notification / 主题设置
pub struct ThemeSettings {
    current: RwLock<Theme>,
    listeners: RwLock<Vec<Listener>>,
}

impl ThemeSettings {
    pub fn new(initial: Theme) -> Self {
        Self {
            current: RwLock::new(initial),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Theme {
        *self.current.read()
    }

    /// Set the theme; subscribers are notified only on an actual change.
    /// Returns whether the value changed.
    pub fn set(&self, theme: Theme) -> bool {
        {
            let mut current = self.current.write();
            if *current == theme {
                return false;
            }
            *current = theme;
        }

        let listeners: Vec<Listener> = self.listeners.read().clone();
        for listener in listeners {
            listener(theme);
        }
        tracing::debug!("Theme changed to {}", theme.as_str());
        true
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }
}

/// Global theme instance / 全局主题实例
static THEME: Lazy<Arc<ThemeSettings>> = Lazy::new(|| Arc::new(ThemeSettings::new(Theme::default())));

pub fn theme_settings() -> Arc<ThemeSettings> {
    THEME.clone()
}

/// Small persistent key-value store (prefs.json) / 偏好存储
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable prefs file {:?}: {}", self.path, e);
            BTreeMap::new()
        });
        all.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }

    /// Saved theme, light when nothing valid is stored / 读取主题
    pub fn load_theme(&self) -> Theme {
        match self.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to read prefs {:?}: {}", self.path, e);
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.set(THEME_KEY, theme.as_str())
    }
}
