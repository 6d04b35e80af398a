// SPDX-License-Identifier: MPL-2.0-only

use std::{fs::File, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

use crate::NAME;

/// Section of the host panel the indicator is added to
#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Default)]
pub enum StatusAreaBox {
    /// left section of the panel
    Left,
    /// center section of the panel
    #[default]
    Center,
    /// right section of the panel
    Right,
}

impl StatusAreaBox {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Config structure for the workspace indicator
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IndicatorConfig {
    /// quiet period before a window preview is created, in milliseconds
    pub preview_debounce_ms: u64,
    /// edge length of a preview icon
    pub preview_icon_size: u32,
    /// themed icon used when neither the application nor the window provide one
    pub fallback_icon: String,
    /// ask the window manager for a single row of workspaces on enable
    pub override_layout: bool,
    /// role the indicator is registered under in the panel status area
    pub status_area_role: String,
    /// position inside the status area box
    pub status_area_position: usize,
    /// status area box the indicator is added to
    pub status_area_box: StatusAreaBox,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            preview_debounce_ms: 100,
            preview_icon_size: 22,
            fallback_icon: "application-x-executable".to_string(),
            override_layout: true,
            status_area_role: "workspace-indicator".to_string(),
            status_area_position: 0,
            status_area_box: StatusAreaBox::Center,
        }
    }
}

static CONFIG_PATH: &str = "config.ron";

impl IndicatorConfig {
    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// load config from the xdg config directory
    pub fn load() -> anyhow::Result<Self> {
        let config_path = match BaseDirectories::with_prefix(NAME)
            .map(|dirs| dirs.find_config_file(CONFIG_PATH))
        {
            Ok(Some(path)) => path,
            _ => anyhow::bail!("Failed to find config file"),
        };
        Self::load_from(&config_path)
    }

    /// load config from an explicit path
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        let file = match File::open(config_path) {
            Ok(file) => file,
            Err(err) => {
                anyhow::bail!("Failed to open '{}': {}", config_path.display(), err);
            }
        };

        match ron::de::from_reader::<_, Self>(file) {
            Ok(config) => Ok(config),
            Err(err) => {
                anyhow::bail!("Failed to parse '{}': {}", config_path.display(), err);
            }
        }
    }

    /// load the config, falling back to the defaults if it is missing or broken
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Falling back to default indicator configuration: {}", err);
                Self::default()
            }
        }
    }

    /// write config to config file
    pub fn write(&self) -> anyhow::Result<()> {
        let xdg = BaseDirectories::with_prefix(NAME)?;
        let path = xdg.place_config_file(CONFIG_PATH)?;
        self.write_to(&path)
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let f = File::create(path)?;
        ron::ser::to_writer_pretty(&f, self, ron::ser::PrettyConfig::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped: IndicatorConfig =
            ron::de::from_str(include_str!("../config.ron")).expect("config.ron should parse");
        assert_eq!(shipped, IndicatorConfig::default());
    }

    #[test]
    fn written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        let config = IndicatorConfig {
            preview_debounce_ms: 250,
            status_area_box: StatusAreaBox::Right,
            ..Default::default()
        };
        config.write_to(&path).unwrap();

        let loaded = IndicatorConfig::load_from(&path).unwrap();
        assert_eq!(loaded.preview_debounce(), Duration::from_millis(250));
        assert_eq!(loaded.status_area_box.as_str(), "right");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        std::fs::write(&path, "(preview_debounce_ms: 10, bogus: true)").unwrap();
        assert!(IndicatorConfig::load_from(&path).is_err());
    }
}
