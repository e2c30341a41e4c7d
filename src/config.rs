use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pattern_config::PatternConfig;
use crate::protocol::ColorFormat;

pub const DEFAULT_PATH: &str = "config/config.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    pub objects: Vec<ObjectConfig>,
    #[serde(default)]
    pub launchpad: Option<LaunchpadConfig>,
    #[serde(default)]
    pub dmx: Option<DmxConfig>,
    #[serde(default)]
    pub buttons_port: Option<u16>,
    #[serde(default)]
    pub mirror: Option<MirrorConfig>,
    #[serde(default)]
    pub patterns: Option<PatternConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hz.
    pub animation_rate: f32,
    /// Seconds a rotation pattern stays up.
    pub rotation_period: f32,
    pub fps_report_interval: f32,
    pub reconnect_interval: f32,
    pub initial_pattern: Option<String>,
    pub cache: Option<CacheConfig>,
}

impl std::default::Default for Settings {
    fn default() -> Self {
        Self {
            animation_rate: 20.0,
            rotation_period: 600.0,
            fps_report_interval: 1.0,
            reconnect_interval: 5.0,
            initial_pattern: None,
            cache: None,
        }
    }
}

impl Settings {
    pub fn rotation_period(&self) -> Duration {
        Duration::from_secs_f32(self.rotation_period.max(0.0))
    }

    pub fn fps_report_interval(&self) -> Duration {
        Duration::from_secs_f32(self.fps_report_interval.max(0.0))
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs_f32(self.reconnect_interval.max(0.0))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub directory: PathBuf,
    /// Seconds recorded per pattern.
    pub duration: f32,
}

impl std::default::Default for CacheConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("/tmp/pattern_cache"), duration: 60.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectConfig {
    pub id: String,
    pub led_config: PathBuf,
    #[serde(default)]
    pub serial: Vec<SerialConfig>,
    #[serde(default)]
    pub opc: Option<OpcConfig>,
    #[serde(default)]
    pub visualizer: Option<VisualizerConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerialConfig {
    pub device: String,
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
    pub uids: Vec<u8>,
    #[serde(default)]
    pub color_format: ColorFormat,
}

fn default_baudrate() -> u32 {
    250_000
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpcConfig {
    pub server_ip: String,
    #[serde(default = "default_opc_port")]
    pub server_port: u16,
    pub uids: Vec<u8>,
}

fn default_opc_port() -> u16 {
    7890
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualizerConfig {
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchpadConfig {
    /// Substring matched against MIDI port names.
    #[serde(default = "default_launchpad_port")]
    pub port: String,
}

fn default_launchpad_port() -> String {
    "LPMiniMK3 MIDI".to_owned()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmxConfig {
    pub device: String,
    /// 1-based channel of the red component.
    #[serde(default = "default_start_channel")]
    pub start_channel: usize,
}

fn default_start_channel() -> usize {
    2
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    pub publish_port: Option<u16>,
    pub subscribe_uri: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let mut config: Config = serde_json::from_str(&text).map_err(|e| ConfigError::json(path, e))?;

        // layouts are relative to the config file
        if let Some(dir) = path.parent() {
            for object in &mut config.objects {
                if object.led_config.is_relative() {
                    object.led_config = dir.join(&object.led_config);
                }
            }
        }
        Ok(config)
    }

    pub fn patterns(&self) -> PatternConfig {
        self.patterns.clone().unwrap_or_else(PatternConfig::builtin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let config: Config = serde_json::from_str(
            r#"{
                "objects": [ {
                    "id": "car",
                    "led_config": "car.json",
                    "serial": [ { "device": "/dev/ttyUSB0", "uids": [1, 2] } ],
                    "opc": { "server_ip": "10.0.0.2", "uids": [3] }
                } ],
                "dmx": { "device": "/dev/ttyUSB1" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.settings, Settings::default());
        let car = &config.objects[0];
        assert_eq!(car.serial[0].baudrate, 250_000);
        assert_eq!(car.serial[0].color_format, ColorFormat::Grb);
        assert_eq!(car.opc.as_ref().unwrap().server_port, 7890);
        assert_eq!(config.dmx.as_ref().unwrap().start_channel, 2);
        assert_eq!(config.patterns(), PatternConfig::builtin());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<Config, _> =
            serde_json::from_str(r#"{ "objects": [], "settings": { "animation_rat": 30 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn color_format_names() {
        let serial: SerialConfig =
            serde_json::from_str(r#"{ "device": "d", "uids": [], "color_format": "RBG" }"#).unwrap();
        assert_eq!(serial.color_format, ColorFormat::Rbg);
    }
}
