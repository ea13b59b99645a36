use simplelog::warn;
#[cfg(feature = "verbose_calls")]
use simplelog::info;
use yaml_rust::{Yaml, YamlLoader};

use super::SoundGenerator;
use crate::config::as_number;
use crate::error::MethodError;
use crate::oscillator::Waveform;
use crate::output::AudioOutput;

/// An incoming call: a method name plus a map of loosely typed arguments.
///
/// Arguments are never validated strictly. A missing key, a value of the wrong type or a
/// non-map argument list all resolve to the documented default of the method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Yaml,
}

/// Successful result of a method call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Null,
    Bool(bool),
    Float(f64),
    Text(String),
}

impl MethodCall {
    pub fn new(method: &str, arguments: Yaml) -> Self {
        Self {
            method: method.to_string(),
            arguments,
        }
    }

    pub fn without_arguments(method: &str) -> Self {
        Self::new(method, Yaml::Null)
    }

    /// Builds a call from YAML (or JSON) text such as `{frequency: 440}`.
    ///
    /// Unparseable text counts as no arguments at all, so every key takes its default.
    pub fn parse(method: &str, arguments: &str) -> Self {
        let arguments = match YamlLoader::load_from_str(arguments) {
            Ok(mut docs) if !docs.is_empty() => docs.swap_remove(0),
            Ok(_) => Yaml::Null,
            Err(err) => {
                warn!(
                    "<b>Malformed arguments for <yellow>{}</><b>: {}</>",
                    method, err
                );
                Yaml::Null
            }
        };
        Self::new(method, arguments)
    }

    /// Numeric argument, integers included. Non finite values count as missing.
    pub fn f64_arg(&self, key: &str, default: f64) -> f64 {
        as_number(&self.arguments[key])
            .filter(|value| value.is_finite())
            .unwrap_or(default)
    }

    pub fn u32_arg(&self, key: &str, default: u32) -> u32 {
        self.arguments[key]
            .as_i64()
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| *value > 0)
            .unwrap_or(default)
    }

    pub fn str_arg<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.arguments[key].as_str().unwrap_or(default)
    }
}

impl<O: AudioOutput> SoundGenerator<O> {
    /// Dispatches one method call. Calls are expected one at a time, from the control thread.
    ///
    /// | method | arguments (default) | reply |
    /// |---|---|---|
    /// | `init` | `sampleRate` (configured rate) | `Bool(true)` |
    /// | `release`, `play`, `stop` | | `Null` |
    /// | `setFrequency` | `frequency` (400.0) | `Null` |
    /// | `setWaveform` | `waveType` (`SINUSOIDAL`) | `Null` |
    /// | `setBalance` | `balance` (0.0) | `Null` |
    /// | `setVolume` | `volume` (1.0) | `Null` |
    /// | `setDecibel` | `decibel` (0.0) | `Null` |
    /// | `getVolume` | | `Float` (linear) |
    /// | `getDecibel` | | `Float` (dB) |
    /// | `getPlatformVersion` | | `Text` |
    ///
    /// # Errors
    /// * [MethodError::Engine] when `play` cannot acquire the audio output.
    /// * [MethodError::NotImplemented] for any other method name.
    pub fn handle(&mut self, call: &MethodCall) -> Result<Reply, MethodError> {
        #[cfg(feature = "verbose_calls")]
        info!(
            "<b>Method call <cyan>{}</><b>: {:?}</>",
            call.method, call.arguments
        );

        match call.method.as_str() {
            "getPlatformVersion" => Ok(Reply::Text(format!(
                "{} {}",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))),
            "init" => {
                let sample_rate = call.u32_arg("sampleRate", self.config().sample_rate);
                Ok(Reply::Bool(self.init(sample_rate)))
            }
            "release" => {
                self.release();
                Ok(Reply::Null)
            }
            "play" => {
                self.play()?;
                Ok(Reply::Null)
            }
            "stop" => {
                self.stop();
                Ok(Reply::Null)
            }
            "setFrequency" => {
                self.set_frequency(call.f64_arg("frequency", 400.0));
                Ok(Reply::Null)
            }
            "setWaveform" => {
                let waveform = Waveform::from_wave_type(call.str_arg("waveType", "SINUSOIDAL"));
                self.set_waveform(waveform);
                Ok(Reply::Null)
            }
            "setBalance" => {
                self.set_balance(call.f64_arg("balance", 0.0));
                Ok(Reply::Null)
            }
            "setVolume" => {
                self.set_volume(call.f64_arg("volume", 1.0));
                Ok(Reply::Null)
            }
            "setDecibel" => {
                self.set_decibel(call.f64_arg("decibel", 0.0));
                Ok(Reply::Null)
            }
            "getVolume" => Ok(Reply::Float(self.volume())),
            "getDecibel" => Ok(Reply::Float(self.decibel())),
            other => Err(MethodError::NotImplemented(other.to_string())),
        }
    }
}
