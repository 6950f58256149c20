use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compositor::layers::CHECKED_BY_DEFAULT;

/// Frame and debug settings, usually read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub frame: FrameSection,
    #[serde(default)]
    pub debug: DebugSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSection {
    /// Frame width in physical pixels.
    pub width: f64,
    /// Frame height in physical pixels.
    pub height: f64,
    pub device_pixel_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSection {
    pub checkerboard_offscreen_layers: bool,
    /// Overrides the build-dependent default for paint precondition checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_paint: Option<bool>,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Whether paint precondition failures are errors.
    pub fn checked_paint(&self) -> bool {
        self.debug.checked_paint.unwrap_or(CHECKED_BY_DEFAULT)
    }

    fn validate(&self) -> Result<()> {
        let frame = &self.frame;
        if !(frame.width.is_finite() && frame.width >= 0.0)
            || !(frame.height.is_finite() && frame.height >= 0.0)
        {
            anyhow::bail!(
                "frame size must be finite and non-negative, got {}x{}",
                frame.width,
                frame.height
            );
        }
        if !(frame.device_pixel_ratio.is_finite() && frame.device_pixel_ratio > 0.0) {
            anyhow::bail!(
                "device_pixel_ratio must be positive, got {}",
                frame.device_pixel_ratio
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.checked_paint(), CHECKED_BY_DEFAULT);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let settings = Settings::from_toml_str(
            "[frame]\ndevice_pixel_ratio = 2.0\n[debug]\nchecked_paint = false\n",
        )
        .unwrap();
        assert_eq!(settings.frame.width, 800.0);
        assert_eq!(settings.frame.device_pixel_ratio, 2.0);
        assert!(!settings.debug.checkerboard_offscreen_layers);
        assert!(!settings.checked_paint());
    }

    #[test]
    fn rejects_non_positive_pixel_ratio() {
        let err = Settings::from_toml_str("[frame]\ndevice_pixel_ratio = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("device_pixel_ratio"));
    }
}
