use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::sketch::settings::SketchSettings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Initial window size. If absent, a default size is used.
    #[serde(default = "default_window_size")]
    pub window_size: Option<(f32, f32)>,
    /// Drawing, hit-testing, and 3D projection tunables.
    #[serde(default)]
    pub sketch: SketchSettings,
}

fn default_window_size() -> Option<(f32, f32)> {
    Some((1024.0, 720.0))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            window_size: default_window_size(),
            sketch: SketchSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`. A missing or empty file yields defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {path}"))?;
        settings.sketch.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    pub fn window_size(&self) -> (f32, f32) {
        match self.window_size {
            Some((w, h)) if w > 0.0 && h > 0.0 => (w, h),
            _ => {
                tracing::warn!(
                    window_size = ?self.window_size,
                    "invalid window size; using default"
                );
                (1024.0, 720.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");
        let loaded = Settings::load(&path.to_string_lossy()).expect("load");
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn roundtrip_preserves_sketch_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        let path = path.to_string_lossy();

        let mut settings = Settings::default();
        settings.debug_logging = true;
        settings.sketch.pencil_width = 9.0;
        settings.sketch.wall_outline = true;
        settings.save(&path).expect("save");

        assert_eq!(Settings::load(&path).expect("load"), settings);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(Settings::load(&path.to_string_lossy()).is_err());
    }

    #[test]
    fn loaded_sketch_settings_are_sanitized() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "sketch": { "wall_height": -4.0 } }"#).expect("write");
        let loaded = Settings::load(&path.to_string_lossy()).expect("load");
        assert_eq!(loaded.sketch.wall_height, 2.0);
        assert!(!loaded.debug_logging);
    }

    #[test]
    fn invalid_window_size_falls_back() {
        let settings = Settings {
            window_size: Some((0.0, 10.0)),
            ..Settings::default()
        };
        assert_eq!(settings.window_size(), (1024.0, 720.0));
    }
}
