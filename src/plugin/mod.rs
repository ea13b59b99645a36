mod channel;
mod events;

pub use channel::{MethodCall, Reply};
pub use events::EventChannel;

use std::sync::Arc;

use simplelog::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::oscillator::{one_cycle, OscillatorCore, OscillatorParams, Waveform};
use crate::output::AudioOutput;

pub const ON_CHANGE_IS_PLAYING: &str = "sound_generator/onChangeIsPlaying";
pub const ON_ONE_CYCLE_DATA: &str = "sound_generator/onOneCycleDataHandler";

/// Lifecycle of the audio engine.
///
/// `Uninitialized → Initialized → Running ⇄ Idle → Released`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    /// Sample rate known, no audio resources acquired yet.
    Initialized,
    Running,
    /// The callback keeps running with its output muted.
    Idle,
    Released,
}

/// The tone generator as seen from the application: one oscillator, its playback state and the
/// audio output it plays through.
///
/// There is meant to be exactly one per process. Construct it once at startup and hand it by
/// reference to whatever dispatches incoming calls (see [`handle`](SoundGenerator::handle)).
///
/// # Parameters
/// Setters write straight into the shared [OscillatorParams] and never fail. They work in any
/// state, before `init` included; the audio callback picks them up on its next buffer.
///
/// # Playback
/// The output stream is opened lazily by the first [`play`](SoundGenerator::play) and then
/// kept open. [`stop`](SoundGenerator::stop) only mutes it, so playing again is immediate.
/// [`release`](SoundGenerator::release) is the only way (besides dropping the generator) of
/// giving the audio resources back.
///
/// Calling `play` before `init`, or after `release`, initializes the engine on the fly with the
/// last known sample rate (the configured default the first time).
pub struct SoundGenerator<O: AudioOutput> {
    output: O,
    config: EngineConfig,
    params: Arc<OscillatorParams>,
    sample_rate: u32,
    state: EngineState,
    stream: Option<O::Stream>,
    /// `true` when playback starts, `false` when it stops. Sent on transitions only.
    pub on_change_is_playing: EventChannel<bool>,
    /// One period of the current waveform, for drawing it.
    pub on_one_cycle_data: EventChannel<Vec<f64>>,
}

impl<O: AudioOutput> SoundGenerator<O> {
    pub fn new(output: O, config: EngineConfig) -> Self {
        Self {
            output,
            sample_rate: config.sample_rate,
            config,
            params: Arc::new(OscillatorParams::new()),
            state: EngineState::Uninitialized,
            stream: None,
            on_change_is_playing: EventChannel::new(ON_CHANGE_IS_PLAYING),
            on_one_cycle_data: EventChannel::new(ON_ONE_CYCLE_DATA),
        }
    }

    // ENGINE LIFECYCLE

    /// Sets the sample rate and brings every parameter back to its default value. Any live
    /// engine is torn down first; audio resources are only acquired by the next `play`.
    ///
    /// A sample rate of zero falls back to the configured default.
    pub fn init(&mut self, sample_rate: u32) -> bool {
        let sample_rate = if sample_rate == 0 {
            warn!(
                "<b>Invalid sample rate, using <yellow>{} Hz</><b> instead.</>",
                self.config.sample_rate
            );
            self.config.sample_rate
        } else {
            sample_rate
        };

        self.teardown();
        self.params.reset();
        self.initialize(sample_rate);
        true
    }

    /// Starts (or resumes) playback.
    ///
    /// # Errors
    /// [EngineError] when the audio output cannot be acquired. Playback does not start and no
    /// event is sent.
    pub fn play(&mut self) -> Result<(), EngineError> {
        if matches!(
            self.state,
            EngineState::Uninitialized | EngineState::Released
        ) {
            info!(
                "<b>Engine not initialized, initializing at <cyan>{} Hz</><b>.</>",
                self.sample_rate
            );
            self.initialize(self.sample_rate);
        }

        if let Err(err) = self.ensure_stream() {
            error!("<b>Unable to start <red>audio engine</><b>: {}</>", err);
            if self.state == EngineState::Running {
                self.params.set_output_gate(false);
                self.state = EngineState::Idle;
                self.on_change_is_playing.send(false);
            }
            return Err(err);
        }

        self.params.set_output_gate(true);
        if self.state != EngineState::Running {
            self.state = EngineState::Running;
            info!("<b>Playback <green>started</>");
            self.on_change_is_playing.send(true);
        }
        self.send_one_cycle();

        Ok(())
    }

    /// Mutes the output and keeps the callback running. Does nothing unless playing.
    pub fn stop(&mut self) {
        if self.state != EngineState::Running {
            return;
        }

        self.params.set_output_gate(false);
        self.state = EngineState::Idle;
        info!("<b>Playback <yellow>stopped</>");
        self.on_change_is_playing.send(false);
    }

    /// Tears the audio output down. Does nothing if already released.
    pub fn release(&mut self) {
        if self.state == EngineState::Released {
            return;
        }

        self.teardown();
        self.state = EngineState::Released;
        info!("<b>Engine <yellow>released</>");
    }

    fn initialize(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.state = EngineState::Initialized;
        info!("<b>Engine initialized at <cyan>{} Hz</>", sample_rate);
    }

    fn teardown(&mut self) {
        if self.state == EngineState::Running {
            self.params.set_output_gate(false);
            self.on_change_is_playing.send(false);
        }
        // Dropping the stream stops the callback, together with the phase it owned
        if self.stream.take().is_some() {
            info!("<b>Output stream <yellow>closed</>");
        }
    }

    fn ensure_stream(&mut self) -> Result<(), EngineError> {
        let alive = match &self.stream {
            Some(stream) => self.output.is_alive(stream),
            None => false,
        };
        if alive {
            return Ok(());
        }

        if self.stream.take().is_some() {
            warn!("<b>Output stream <yellow>lost</><b>, opening a new one.</>");
        }

        let core = OscillatorCore::new(self.params.clone(), self.sample_rate);
        self.stream = Some(self.output.open(core)?);
        Ok(())
    }

    // PARAMETERS

    pub fn set_frequency(&mut self, hz: f64) {
        self.params.set_frequency(hz);
        self.send_one_cycle();
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.params.set_waveform(waveform);
        self.send_one_cycle();
    }

    pub fn set_balance(&mut self, pan: f64) {
        self.params.set_pan(pan);
    }

    pub fn set_volume(&mut self, gain: f64) {
        self.params.set_volume(gain);
        self.send_one_cycle();
    }

    pub fn set_decibel(&mut self, db: f64) {
        self.params.set_volume_from_decibel(db);
        self.send_one_cycle();
    }

    pub fn volume(&self) -> f64 {
        self.params.volume()
    }

    /// Current volume in decibels (`20·log10(volume)`), `-inf` when silent.
    pub fn decibel(&self) -> f64 {
        self.params.decibel()
    }

    fn send_one_cycle(&mut self) {
        if !self.on_one_cycle_data.has_listener() {
            return;
        }
        let cycle = one_cycle(
            self.params.waveform(),
            self.params.frequency(),
            self.sample_rate,
            self.params.volume(),
        );
        self.on_one_cycle_data.send(cycle);
    }

    // STATE

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &Arc<OscillatorParams> {
        &self.params
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// The live output stream, if `play` opened one.
    pub fn stream_mut(&mut self) -> Option<&mut O::Stream> {
        self.stream.as_mut()
    }
}

impl<O: AudioOutput> Drop for SoundGenerator<O> {
    fn drop(&mut self) {
        // Nothing was acquired yet
        if self.state == EngineState::Uninitialized {
            return;
        }
        self.release();
    }
}
