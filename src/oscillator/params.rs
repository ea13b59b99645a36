use crossbeam::atomic::AtomicCell;

use super::Waveform;

pub const DEFAULT_FREQUENCY: f64 = 440.0;
pub const DEFAULT_VOLUME: f64 = 1.0;
pub const DEFAULT_PAN: f64 = 0.0;

/// Parameters shared between the control thread (writer) and the render callback (reader).
///
/// Every field is its own atomic cell: a read never observes a torn value, but there is no
/// consistent snapshot across fields. The render callback loads each field once per buffer,
/// so a change becomes audible at most one buffer late.
///
/// The output gate is the playback mute. It is `0.0` while stopped and `1.0` while playing;
/// the callback keeps running either way.
#[derive(Debug)]
pub struct OscillatorParams {
    frequency: AtomicCell<f64>,
    volume: AtomicCell<f64>,
    pan: AtomicCell<f64>,
    waveform: AtomicCell<u8>,
    output_gate: AtomicCell<f64>,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            frequency: AtomicCell::new(DEFAULT_FREQUENCY),
            volume: AtomicCell::new(DEFAULT_VOLUME),
            pan: AtomicCell::new(DEFAULT_PAN),
            waveform: AtomicCell::new(Waveform::Sine.index()),
            output_gate: AtomicCell::new(0.0),
        }
    }
}

impl OscillatorParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores every parameter to its default value and mutes the output.
    pub fn reset(&self) {
        self.frequency.store(DEFAULT_FREQUENCY);
        self.volume.store(DEFAULT_VOLUME);
        self.pan.store(DEFAULT_PAN);
        self.waveform.store(Waveform::Sine.index());
        self.output_gate.store(0.0);
    }

    pub fn set_frequency(&self, hz: f64) {
        self.frequency.store(hz);
    }

    pub fn set_volume(&self, gain: f64) {
        self.volume.store(gain);
    }

    /// Sets the volume from a decibel value (`gain = 10^(db / 20)`).
    pub fn set_volume_from_decibel(&self, db: f64) {
        self.volume.store(decibel_to_gain(db));
    }

    pub fn set_pan(&self, pan: f64) {
        self.pan.store(pan);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index());
    }

    /// Stores a raw waveform selector. Unknown selectors render as a sine.
    pub fn set_waveform_index(&self, index: u8) {
        self.waveform.store(index);
    }

    pub fn set_output_gate(&self, open: bool) {
        self.output_gate.store(if open { 1.0 } else { 0.0 });
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.load()
    }

    pub fn volume(&self) -> f64 {
        self.volume.load()
    }

    /// Current volume expressed in decibels. A silent volume yields `-inf`.
    pub fn decibel(&self) -> f64 {
        gain_to_decibel(self.volume.load())
    }

    pub fn pan(&self) -> f64 {
        self.pan.load()
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load())
    }

    pub fn output_gate(&self) -> f64 {
        self.output_gate.load()
    }
}

pub fn decibel_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Level of `gain` in decibels. The sign is a phase flip, so only the magnitude counts.
pub fn gain_to_decibel(gain: f64) -> f64 {
    20.0 * gain.abs().log10()
}
