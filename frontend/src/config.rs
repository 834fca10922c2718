//! Viewer configuration
//!
//! Defaults match the built-in layout; a TOML file may override any subset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DRAG_HANDLE_HEIGHT_PX: f32 = 28.0;
pub const DEFAULT_DETAILS_HEIGHT_PX: f32 = 230.0 + DRAG_HANDLE_HEIGHT_PX;
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub details_panel: DetailsPanelConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DetailsPanelConfig {
    /// Height of the drag handle; also the fully-collapsed panel height.
    #[serde(default = "default_drag_handle_height")]
    pub drag_handle_height: f32,
    /// Height the panel snaps to when expanded, handle included.
    #[serde(default = "default_details_height")]
    pub default_height: f32,
}

impl Default for DetailsPanelConfig {
    fn default() -> Self {
        Self {
            drag_handle_height: DRAG_HANDLE_HEIGHT_PX,
            default_height: DEFAULT_DETAILS_HEIGHT_PX,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// Minimum delay between two pushes of local state to the controller.
    #[serde(default = "default_sync_interval_ms")]
    pub local_state_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_state_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.local_state_interval_ms)
    }
}

fn default_drag_handle_height() -> f32 {
    DRAG_HANDLE_HEIGHT_PX
}

fn default_details_height() -> f32 {
    DEFAULT_DETAILS_HEIGHT_PX
}

fn default_sync_interval_ms() -> u64 {
    DEFAULT_SYNC_INTERVAL_MS
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(content).context("Failed to parse viewer config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let panel = &self.details_panel;
        if !(panel.drag_handle_height.is_finite() && panel.drag_handle_height > 0.0) {
            anyhow::bail!(
                "details_panel.drag_handle_height must be positive, got {}",
                panel.drag_handle_height
            );
        }
        if !(panel.default_height.is_finite() && panel.default_height > panel.drag_handle_height) {
            anyhow::bail!(
                "details_panel.default_height ({}) must exceed drag_handle_height ({})",
                panel.default_height,
                panel.drag_handle_height
            );
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    ViewerConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}
