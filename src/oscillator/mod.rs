mod core;
mod panner;
mod params;
mod phase;
mod waveform;

pub use self::core::OscillatorCore;
pub use panner::{gains, StereoGains};
pub use params::{
    decibel_to_gain, gain_to_decibel, OscillatorParams, DEFAULT_FREQUENCY, DEFAULT_PAN,
    DEFAULT_VOLUME,
};
pub use phase::{increment, PhaseAccumulator};
pub use waveform::{one_cycle, OscillatorMath, Waveform};
