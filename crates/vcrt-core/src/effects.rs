// ABOUTME: CRT post-processing parameters.
// ABOUTME: Controls curvature, scanlines, bloom, vignette and brightness of the presented image.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Run the CRT pass at all; when false the scene is presented flat
    pub enabled: bool,

    /// Screen curvature amount (0.0 = flat, 1.0 = very curved)
    pub screen_curvature: f32,

    /// Scanline intensity (0.0 = none, 1.0 = strong)
    pub scanline_intensity: f32,

    /// Bloom/glow amount (0.0 = none, 1.0 = strong)
    pub bloom: f32,

    /// Vignette intensity - darkening toward screen edges
    pub vignette: f32,

    /// Overall brightness
    pub brightness: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self::phosphor()
    }
}

impl EffectSettings {
    /// Oscilloscope tube look
    pub fn phosphor() -> Self {
        Self {
            enabled: true,
            screen_curvature: 0.08,
            scanline_intensity: 0.3,
            bloom: 0.45,
            vignette: 0.25,
            brightness: 1.0,
        }
    }

    /// Pass-through presentation
    pub fn flat() -> Self {
        Self {
            enabled: false,
            screen_curvature: 0.0,
            scanline_intensity: 0.0,
            bloom: 0.0,
            vignette: 0.0,
            brightness: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_disables_the_pass() {
        let flat = EffectSettings::flat();
        assert!(!flat.enabled);
        assert_eq!(flat.brightness, 1.0);
    }

    #[test]
    fn missing_fields_fall_back_to_phosphor() {
        let settings: EffectSettings = toml::from_str("bloom = 0.9").unwrap();
        assert_eq!(settings.bloom, 0.9);
        assert_eq!(settings.screen_curvature, EffectSettings::phosphor().screen_curvature);
        assert!(settings.enabled);
    }
}
