use std::{error::Error, fmt, fs, path::Path};

use bevy::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::data::{
    buttons::{button_from_name, Device},
    mapping::{MappedAction, MappedButton},
};

const EMBEDDED_CONFIG_JSON: &str = include_str!("./content/menu_config.json");
const CONFIG_PATH_ENV: &str = "VR_FRONTEND_CONFIG";

static EMBEDDED_CONFIG: Lazy<MenuConfig> = Lazy::new(|| {
    MenuConfig::from_json(EMBEDDED_CONFIG_JSON).unwrap_or_else(|error| {
        warn!("embedded menu config is invalid: {error}; using compiled-in defaults");
        MenuConfig::fallback()
    })
});

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config i/o error: {err}"),
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::Validation(err) => write!(f, "config validation error: {err}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatConfig {
    /// Hold time before auto-repeat may fire at all.
    pub scroll_delay: f32,
    /// Hold time consumed per horizontal repeat.
    pub scroll_time_h: f32,
    /// Hold time consumed per vertical repeat.
    pub scroll_time_v: f32,
    /// Horizontal repeat on the save slot button.
    pub slot_time_h: f32,
    /// Horizontal repeat on the screen placement buttons.
    pub adjust_time_h: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub stick_threshold: f32,
    pub trigger_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionConfig {
    pub duration: f32,
    pub stagger: f32,
    pub slide_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    pub open_menu_duration: f32,
    pub mapping_overlay_duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemapConfig {
    pub timeout_seconds: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListConfig {
    pub lookbehind_rows: usize,
    pub lookahead_rows: usize,
    pub max_ease_rows: f32,
    pub ease_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenConfig {
    pub rotate_step: f32,
    pub scale_step: f32,
    pub distance_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub default_distance: f32,
    pub default_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    pub device: Device,
    pub button: String,
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuConfig {
    pub repeat: RepeatConfig,
    pub input: InputConfig,
    pub transition: TransitionConfig,
    pub overlay: OverlayConfig,
    pub remap: RemapConfig,
    pub list: ListConfig,
    pub screen: ScreenConfig,
    pub save_slots: usize,
    pub settings_version: i32,
    pub menu_bindings: Vec<BindingConfig>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        EMBEDDED_CONFIG.clone()
    }
}

impl MenuConfig {
    pub fn fallback() -> Self {
        Self {
            repeat: RepeatConfig {
                scroll_delay: 0.3,
                scroll_time_h: 0.075,
                scroll_time_v: 0.075,
                slot_time_h: 0.1,
                adjust_time_h: 0.025,
            },
            input: InputConfig {
                stick_threshold: 0.5,
                trigger_threshold: 0.25,
            },
            transition: TransitionConfig {
                duration: 0.15,
                stagger: 0.35,
                slide_distance: 75.0,
            },
            overlay: OverlayConfig {
                open_menu_duration: 0.15,
                mapping_overlay_duration: 0.15,
            },
            remap: RemapConfig {
                timeout_seconds: 4.0,
            },
            list: ListConfig {
                lookbehind_rows: 3,
                lookahead_rows: 4,
                max_ease_rows: 10.0,
                ease_rate: 25.0,
            },
            screen: ScreenConfig {
                rotate_step: 0.5,
                scale_step: 0.03125,
                distance_step: 0.0625,
                min_distance: 0.5,
                max_distance: 10.0,
                min_scale: 0.25,
                max_scale: 2.5,
                default_distance: 5.5,
                default_scale: 1.0,
            },
            save_slots: 10,
            settings_version: 27,
            menu_bindings: vec![
                BindingConfig {
                    device: Device::Gamepad,
                    button: "Y".to_string(),
                },
                BindingConfig {
                    device: Device::LeftController,
                    button: "Enter".to_string(),
                },
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MenuConfig =
            serde_json::from_str(json).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&json)
    }

    /// Embedded config, or the file named by `VR_FRONTEND_CONFIG` when set.
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_PATH_ENV) else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                info!("loaded menu config from {path}");
                config
            }
            Err(error) => {
                warn!("failed to load menu config from {path}: {error}; using defaults");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("repeat.scroll_time_h", self.repeat.scroll_time_h),
            ("repeat.scroll_time_v", self.repeat.scroll_time_v),
            ("repeat.slot_time_h", self.repeat.slot_time_h),
            ("repeat.adjust_time_h", self.repeat.adjust_time_h),
            ("transition.duration", self.transition.duration),
            ("overlay.open_menu_duration", self.overlay.open_menu_duration),
            ("overlay.mapping_overlay_duration", self.overlay.mapping_overlay_duration),
            ("remap.timeout_seconds", self.remap.timeout_seconds),
            ("list.max_ease_rows", self.list.max_ease_rows),
            ("list.ease_rate", self.list.ease_rate),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        if self.repeat.scroll_delay < 0.0 {
            return Err(ConfigError::Validation(
                "repeat.scroll_delay must not be negative".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.transition.stagger) {
            return Err(ConfigError::Validation(
                "transition.stagger must be in [0, 1)".to_string(),
            ));
        }
        if self.screen.min_distance > self.screen.max_distance
            || self.screen.min_scale > self.screen.max_scale
        {
            return Err(ConfigError::Validation(
                "screen clamps must have min <= max".to_string(),
            ));
        }
        if self.save_slots == 0 {
            return Err(ConfigError::Validation(
                "save_slots must be at least 1".to_string(),
            ));
        }
        if self.menu_bindings.len() > 2 {
            return Err(ConfigError::Validation(
                "at most two menu bindings are supported".to_string(),
            ));
        }
        for binding in &self.menu_bindings {
            if button_from_name(&binding.button).is_none() {
                return Err(ConfigError::Validation(format!(
                    "unknown button name `{}`",
                    binding.button
                )));
            }
        }
        Ok(())
    }

    /// Compiled-in default for the open-menu action.
    pub fn default_menu_binding(&self) -> MappedAction {
        let mut action = MappedAction::default();
        for (slot, binding) in action.buttons.iter_mut().zip(&self.menu_bindings) {
            if let Some(button) = button_from_name(&binding.button) {
                *slot = MappedButton::bound(binding.device, button);
            }
        }
        action
    }
}
