//! A programmatic tone generator: one sine/square/triangle/sawtooth oscillator with frequency,
//! volume and stereo balance control, driven through method calls.
//!
//! The interesting part is the render path. [OscillatorCore](oscillator::OscillatorCore) runs
//! inside the audio callback and reads its parameters from lock-free atomic cells, so the
//! control thread can change them at any time without ever blocking the audio thread.
//!
//! ```
//! use sound_generator::back_end::Channels;
//! use sound_generator::config::EngineConfig;
//! use sound_generator::output::OfflineOutput;
//! use sound_generator::plugin::{MethodCall, SoundGenerator};
//!
//! let mut generator = SoundGenerator::new(OfflineOutput::new(Channels::Stereo), EngineConfig::default());
//! generator.handle(&MethodCall::parse("init", "{sampleRate: 48000}")).unwrap();
//! generator.handle(&MethodCall::parse("setFrequency", "{frequency: 440}")).unwrap();
//! generator.handle(&MethodCall::without_arguments("play")).unwrap();
//!
//! let samples = generator.stream_mut().unwrap().render(512);
//! assert_eq!(samples.len(), 1024);
//! ```

pub mod back_end;
pub mod config;
pub mod error;
pub mod oscillator;
pub mod output;
pub mod plugin;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, MethodError};
pub use plugin::{MethodCall, Reply, SoundGenerator};
