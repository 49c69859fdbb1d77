//! Planner settings: named task defaults, timeline padding and cell sizes.
//!
//! Settings live in `settings.json` inside the OS config directory. Every
//! field carries `#[serde(default)]`, so a partial file is valid and missing
//! keys fall back to the built-in values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GanttError, Result};
use crate::model::{CellGeometry, TaskColor, TaskStatus};

const SETTINGS_FILE: &str = "settings.json";

/// Values applied when a new task leaves a field unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefaults {
    pub color: TaskColor,
    pub priority: u8,
    pub status: TaskStatus,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            color: TaskColor::Blue,
            priority: 2,
            status: TaskStatus::Todo,
        }
    }
}

/// Padding around the visible date window, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Days shown before the earliest task start.
    pub lead_days: i64,
    /// Days shown after the latest task end.
    pub trail_days: i64,
    /// With no tasks: days shown before today.
    pub empty_lead_days: i64,
    /// With no tasks: days shown after today.
    pub empty_trail_days: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lead_days: 5,
            trail_days: 10,
            empty_lead_days: 3,
            empty_trail_days: 27,
        }
    }
}

/// Top-level persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub defaults: TaskDefaults,
    pub layout: LayoutConfig,
    pub geometry: CellGeometry,
}

impl GanttConfig {
    /// Location of the settings file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "GanttPlanner")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from the OS config directory. A missing or unreadable
    /// file yields the defaults; the problem is logged, never fatal.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::debug!("no config directory available, using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "falling back to default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file absent, using defaults");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json).map_err(|e| GanttError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "settings written");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.defaults.priority) {
            return Err(GanttError::Config {
                reason: format!("default priority {} is outside 1..=3", self.defaults.priority),
            });
        }
        let layout = &self.layout;
        if layout.lead_days < 0
            || layout.trail_days < 0
            || layout.empty_lead_days < 0
            || layout.empty_trail_days < 0
        {
            return Err(GanttError::Config {
                reason: "timeline padding must not be negative".to_string(),
            });
        }
        if self.geometry.cell_width <= 0.0 || self.geometry.row_height <= 0.0 {
            return Err(GanttError::Config {
                reason: "cell sizes must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_falls_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "defaults": { "color": "green" }, "layout": { "trail_days": 14 } }"#)
            .unwrap();

        let config = GanttConfig::load_from(&path).unwrap();
        assert_eq!(config.defaults.color, TaskColor::Green);
        assert_eq!(config.defaults.priority, 2);
        assert_eq!(config.layout.trail_days, 14);
        assert_eq!(config.layout.lead_days, 5);
        assert_eq!(config.geometry, CellGeometry::default());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GanttConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, GanttConfig::default());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GanttConfig::load_from(&path),
            Err(GanttError::Config { .. })
        ));
    }

    #[test]
    fn negative_padding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "layout": { "lead_days": -1 } }"#).unwrap();
        assert!(matches!(
            GanttConfig::load_from(&path),
            Err(GanttError::Config { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut config = GanttConfig::default();
        config.defaults.status = TaskStatus::Doing;
        config.save_to(&path).unwrap();
        assert_eq!(GanttConfig::load_from(&path).unwrap(), config);
    }
}
