//! Viewer color theme, updatable by the host at runtime.

use axis_bridge::ThemePayload;

/// Scene colors as hex strings, the form the host sends them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub scene_bg: String,
    pub floor: String,
    pub ambient: String,
    pub hemi: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            scene_bg: "#FFF8F3".to_string(),
            floor: "#FFF1E7".to_string(),
            ambient: "#fb923c".to_string(),
            hemi: "#f97316".to_string(),
        }
    }
}

/// Fill lights derived from the theme, rebuilt on every theme change.
#[derive(Debug, Clone, PartialEq)]
pub struct FillLights {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub hemi_color: [f32; 3],
    pub hemi_intensity: f32,
}

impl Theme {
    /// Merge a partial update; unset fields keep their current value.
    pub fn merge(&mut self, update: &ThemePayload) {
        if let Some(value) = &update.scene_bg {
            self.scene_bg = value.clone();
        }
        if let Some(value) = &update.floor {
            self.floor = value.clone();
        }
        if let Some(value) = &update.ambient {
            self.ambient = value.clone();
        }
        if let Some(value) = &update.hemi {
            self.hemi = value.clone();
        }
    }

    pub fn fill_lights(&self) -> FillLights {
        FillLights {
            ambient_color: parse_hex_rgb(&self.ambient).unwrap_or([1.0, 1.0, 1.0]),
            ambient_intensity: 0.2,
            hemi_color: parse_hex_rgb(&self.hemi).unwrap_or([1.0, 1.0, 1.0]),
            hemi_intensity: 0.1,
        }
    }
}

/// Parse `#RRGGBB` into linear 0..1 components.
pub fn parse_hex_rgb(value: &str) -> Option<[f32; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .ok()
            .map(|byte| byte as f32 / 255.0)
    };
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
