// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composition settings.
//!
//! Settings decide which node kind counts as a material's terminal,
//! which registry templates build the blend and sink nodes, and which
//! socket names are wired. They are stored as RON.

use crate::node::NodeKind;
use crate::ratio::Ratio;
use crate::shading;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse failure
    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization failure
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Settings version {0} is newer than supported version {max}", max = SETTINGS_FORMAT_VERSION)]
    UnsupportedVersion(u32),

    /// Default ratio outside `[0, 1]`
    #[error("Default ratio must be between 0 and 1, got {0}")]
    InvalidRatio(f64),

    /// Two blend roles share one input, so one link would evict the other
    #[error("Blend input '{0}' is assigned more than once")]
    SharedBlendInput(String),
}

/// How two materials are composed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeSettings {
    /// Format version
    pub version: u32,
    /// Kind of node whose output is a material's final result
    pub terminal_kind: NodeKind,
    /// Output socket carrying that result
    pub terminal_socket: String,
    /// Registry template used for the blend node
    pub blend_template: String,
    /// Blend inputs fed by the first and second material
    pub blend_inputs: [String; 2],
    /// Blend input holding the ratio
    pub factor_socket: String,
    /// Blend output
    pub blend_output: String,
    /// Registry template used when a sink must be created
    pub sink_template: String,
    /// Sink input the blend output is wired to
    pub sink_input: String,
    /// Ratio offered before the user picks one
    pub default_ratio: f64,
    /// Horizontal distance between layout columns
    pub spacing: f32,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            terminal_kind: NodeKind::PrincipledShader,
            terminal_socket: "Color".to_string(),
            blend_template: shading::MIX_RGB.to_string(),
            blend_inputs: ["Color1".to_string(), "Color2".to_string()],
            factor_socket: "Fac".to_string(),
            blend_output: "Color".to_string(),
            sink_template: shading::MATERIAL_OUTPUT.to_string(),
            sink_input: "Surface".to_string(),
            default_ratio: 0.5,
            spacing: 300.0,
        }
    }
}

impl ComposeSettings {
    /// Blend the image textures of two materials instead of their shaders
    pub fn textures() -> Self {
        Self {
            terminal_kind: NodeKind::ImageSource,
            ..Self::default()
        }
    }

    /// Parse settings from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion(settings.version));
        }
        Ratio::new(settings.default_ratio)
            .map_err(|_| SettingsError::InvalidRatio(settings.default_ratio))?;
        if let Some(name) = settings.shared_blend_input() {
            return Err(SettingsError::SharedBlendInput(name.to_string()));
        }

        Ok(settings)
    }

    /// First blend input named by more than one of the two material
    /// inputs and the factor input
    pub fn shared_blend_input(&self) -> Option<&str> {
        let [first, second] = &self.blend_inputs;
        if first == second || *first == self.factor_socket {
            Some(first)
        } else if *second == self.factor_socket {
            Some(second)
        } else {
            None
        }
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Render as pretty RON
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ComposeSettings::default();
        assert_eq!(settings.terminal_kind, NodeKind::PrincipledShader);
        assert_eq!(settings.terminal_socket, "Color");
        assert_eq!(settings.default_ratio, 0.5);
    }

    #[test]
    fn test_serialization() {
        let settings = ComposeSettings::textures();
        let ron_str = settings.to_ron_string().unwrap();
        let loaded = ComposeSettings::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = ComposeSettings::from_ron_str("(terminal_kind: ImageSource, default_ratio: 0.25)").unwrap();
        assert_eq!(loaded.terminal_kind, NodeKind::ImageSource);
        assert_eq!(loaded.default_ratio, 0.25);
        assert_eq!(loaded.sink_input, "Surface");
    }

    #[test]
    fn test_rejects_bad_ratio_and_version() {
        assert!(matches!(
            ComposeSettings::from_ron_str("(default_ratio: 2.0)"),
            Err(SettingsError::InvalidRatio(_))
        ));
        assert!(matches!(
            ComposeSettings::from_ron_str("(version: 99)"),
            Err(SettingsError::UnsupportedVersion(99))
        ));
        assert!(matches!(
            ComposeSettings::from_ron_str("(terminal_socket: )"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_shared_blend_inputs() {
        assert!(matches!(
            ComposeSettings::from_ron_str(r#"(blend_inputs: ("Color1", "Color1"))"#),
            Err(SettingsError::SharedBlendInput(name)) if name == "Color1"
        ));
        assert!(matches!(
            ComposeSettings::from_ron_str(r#"(factor_socket: "Color2")"#),
            Err(SettingsError::SharedBlendInput(name)) if name == "Color2"
        ));
        assert_eq!(ComposeSettings::default().shared_blend_input(), None);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("texmix-settings-{}.ron", std::process::id()));
        let settings = ComposeSettings {
            default_ratio: 0.75,
            ..ComposeSettings::default()
        };

        settings.save(&path).unwrap();
        let loaded = ComposeSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let missing = Path::new("does/not/exist.ron");
        assert!(matches!(ComposeSettings::load(missing), Err(SettingsError::Io(_))));
    }
}
