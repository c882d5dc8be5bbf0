//! Viewer configuration
//!
//! Loaded from a RON file when one is supplied on the command line;
//! otherwise defaults point at the bundled demo scene.

use serde::Deserialize;
use std::path::Path;

/// Settings for a headless viewer run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene description to load.
    pub scene: String,
    /// Number of frames to run.
    pub frames: u32,
    /// Animation hook to drive each frame, if any.
    pub animation: Option<String>,
    /// Seconds advanced per frame when animating.
    pub time_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene: "viewer_app/scenes/station.xml".to_string(),
            frames: 3,
            animation: Some("spin".to_string()),
            time_step: 0.5,
        }
    }
}

impl ViewerConfig {
    /// Load a config file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("could not read config `{}`: {e}", path.display()))?;
        ron::from_str(&text).map_err(|e| format!("invalid config `{}`: {e}", path.display()))
    }
}
