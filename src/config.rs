use log::LevelFilter;
use simplelog::{info, warn};
use yaml_rust::{Yaml, YamlLoader};

use crate::back_end::Channels;
use crate::error::ConfigError;

pub const CONFIG_VERSION: f64 = 0.1;
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

const KNOWN_KEYS: [&str; 6] = [
    "version",
    "sample-rate",
    "channels",
    "buffer-frames",
    "device",
    "log-level",
];

/// Engine wide settings. Everything else (frequency, volume...) is runtime only and goes back
/// to its default on every `init`.
///
/// # YAML format
/// ```yaml
/// version: 0.1
/// sample-rate: 44100     # Hz, used when `init` does not provide one
/// channels: stereo       # mono, stereo or a channel count
/// buffer-frames: 512     # omit to let the device decide
/// device: "USB Audio"    # omit for the default output device
/// log-level: debug
/// ```
/// Every key but `version` is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub channels: Channels,
    pub buffer_frames: Option<u32>,
    pub device_name: Option<String>,
    pub log_level: LevelFilter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: Channels::Stereo,
            buffer_frames: None,
            device_name: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_frames = Some(frames);
        self
    }

    pub fn with_device_name(mut self, name: &str) -> Self {
        self.device_name = Some(name.to_string());
        self
    }

    /// Parses a configuration document. Missing keys keep their default value.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(source)?;
        let doc = docs.first().ok_or(ConfigError::Empty)?;

        let hash = doc.as_hash().ok_or_else(|| ConfigError::InvalidValue {
            key: "<root>".to_string(),
            reason: "expected a mapping".to_string(),
        })?;

        let version = as_number(&doc["version"]).unwrap_or(0.0);
        if version != CONFIG_VERSION {
            return Err(ConfigError::Version {
                found: version,
                expected: CONFIG_VERSION,
            });
        }

        for key in hash.keys() {
            match key.as_str() {
                Some(name) if KNOWN_KEYS.contains(&name) => {}
                _ => warn!("<b>Unknown configuration key <yellow>{:?}</><b>, ignoring it.</>", key),
            }
        }

        let mut config = Self::default();

        if let Some(sample_rate) = positive_u32(doc, "sample-rate")? {
            config.sample_rate = sample_rate;
        }

        match &doc["channels"] {
            Yaml::BadValue => {}
            Yaml::String(name) => {
                config.channels = match name.to_lowercase().as_str() {
                    "mono" => Channels::Mono,
                    "stereo" => Channels::Stereo,
                    _ => return Err(invalid("channels", "expected mono, stereo or a count")),
                }
            }
            Yaml::Integer(count) => {
                config.channels = match u8::try_from(*count) {
                    Ok(1) => Channels::Mono,
                    Ok(2) => Channels::Stereo,
                    Ok(count) if count > 0 => Channels::Multi(count),
                    _ => return Err(invalid("channels", "channel count out of range")),
                }
            }
            _ => return Err(invalid("channels", "expected mono, stereo or a count")),
        }

        config.buffer_frames = positive_u32(doc, "buffer-frames")?;

        match &doc["device"] {
            Yaml::BadValue | Yaml::Null => {}
            Yaml::String(name) => config.device_name = Some(name.clone()),
            _ => return Err(invalid("device", "expected a device name")),
        }

        match &doc["log-level"] {
            Yaml::BadValue => {}
            Yaml::String(level) => {
                config.log_level = level
                    .parse()
                    .map_err(|_| invalid("log-level", "unknown level"))?;
            }
            _ => return Err(invalid("log-level", "expected a level name")),
        }

        info!(
            "<b>Loaded engine configuration <cyan>v{}</><b>.</>",
            CONFIG_VERSION
        );
        info!("  |_ sample rate: {}", config.sample_rate);
        info!("  |_ channels: {:?}", config.channels);

        Ok(config)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// YAML does not tell `48000` from `48000.0` apart for us: accept both.
pub(crate) fn as_number(yaml: &Yaml) -> Option<f64> {
    match yaml {
        Yaml::Real(_) => yaml.as_f64(),
        Yaml::Integer(value) => Some(*value as f64),
        _ => None,
    }
}

fn positive_u32(doc: &Yaml, key: &str) -> Result<Option<u32>, ConfigError> {
    match &doc[key] {
        Yaml::BadValue => Ok(None),
        Yaml::Integer(value) => u32::try_from(*value)
            .ok()
            .filter(|value| *value > 0)
            .map(Some)
            .ok_or_else(|| invalid(key, "expected a positive integer")),
        _ => Err(invalid(key, "expected a positive integer")),
    }
}
