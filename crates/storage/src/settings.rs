use serde::{Deserialize, Serialize};
use simplepres_core::{
    clamp_width, Color, EditConfig, StrokeStyle, StylePolicy, DEFAULT_WIDTH, DEFAULT_WIDTH_STEP,
    MAX_WIDTH,
};

pub const DEFAULT_WINDOW_WIDTH: f32 = 600.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 899.0;

const MIN_WINDOW_EDGE: f32 = 200.0;
const MAX_WINDOW_EDGE: f32 = 16384.0;

/// User settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color of new strokes
    pub default_color: Color,
    /// Width of new strokes
    pub default_width: f32,
    /// Width change per increase/decrease key press
    pub width_step: f32,
    pub style_policy: StylePolicy,
    pub window_width: f32,
    pub window_height: f32,
    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_color: Color::BLACK,
            default_width: DEFAULT_WIDTH,
            width_step: DEFAULT_WIDTH_STEP,
            style_policy: StylePolicy::default(),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Copy with every out-of-range value replaced by something usable
    pub fn sanitized(&self) -> Self {
        let width_step = if self.width_step.is_finite() && self.width_step > 0.0 {
            self.width_step.min(MAX_WIDTH)
        } else {
            DEFAULT_WIDTH_STEP
        };

        Self {
            default_width: clamp_width(self.default_width),
            width_step,
            window_width: window_edge(self.window_width, DEFAULT_WINDOW_WIDTH),
            window_height: window_edge(self.window_height, DEFAULT_WINDOW_HEIGHT),
            ..self.clone()
        }
    }

    /// Editing configuration for a new session
    pub fn edit_config(&self) -> EditConfig {
        let settings = self.sanitized();
        EditConfig {
            default_style: StrokeStyle::new(settings.default_color, settings.default_width),
            width_step: settings.width_step,
            style_policy: settings.style_policy,
        }
    }
}

fn window_edge(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_WINDOW_EDGE, MAX_WINDOW_EDGE)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplepres_core::MIN_WIDTH;

    #[test]
    fn sanitizes_out_of_range_values() {
        let settings = Settings {
            default_width: -4.0,
            width_step: f32::NAN,
            window_width: 10.0,
            window_height: f32::INFINITY,
            ..Settings::default()
        };

        let clean = settings.sanitized();
        assert_eq!(clean.default_width, MIN_WIDTH);
        assert_eq!(clean.width_step, DEFAULT_WIDTH_STEP);
        assert_eq!(clean.window_width, MIN_WINDOW_EDGE);
        assert_eq!(clean.window_height, DEFAULT_WINDOW_HEIGHT);
    }

    #[test]
    fn edit_config_follows_settings() {
        let settings = Settings {
            default_color: Color::RED,
            default_width: 5.0,
            width_step: 0.5,
            style_policy: StylePolicy::LastUsed,
            ..Settings::default()
        };

        let config = settings.edit_config();
        assert_eq!(config.default_style, StrokeStyle::new(Color::RED, 5.0));
        assert_eq!(config.width_step, 0.5);
        assert_eq!(config.style_policy, StylePolicy::LastUsed);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "style_policy": "last_used" }"#).expect("parse partial settings");

        assert_eq!(settings.style_policy, StylePolicy::LastUsed);
        assert_eq!(settings.default_width, DEFAULT_WIDTH);
        assert_eq!(settings.window_height, DEFAULT_WINDOW_HEIGHT);
    }
}
