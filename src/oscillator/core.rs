use std::sync::Arc;

use cpal::{FromSample, Sample};

use super::panner::{gains, StereoGains};
use super::{OscillatorParams, PhaseAccumulator};

/// The render side of the oscillator. It is created when an output stream is opened and moved
/// into the audio callback, which becomes its only owner.
///
/// # Parameters and phase
/// Frequency, volume, pan, waveform and the output gate are read from the shared
/// [OscillatorParams] once per buffer. The phase is private to the core: it is frame accurate,
/// persists from one buffer to the next, and is only ever reset by creating a new core.
///
/// # Real time
/// [`render_interleaved`](OscillatorCore::render_interleaved) and
/// [`render_planar`](OscillatorCore::render_planar) never allocate, lock, log or block.
///
/// # Channels
/// * Mono: the raw sample, no panning.
/// * Stereo: equal-power panned left and right.
/// * More than two channels: the extra channels mirror the right channel.
pub struct OscillatorCore {
    params: Arc<OscillatorParams>,
    sample_rate: u32,
    phase: f64,
    /// Gate value reached at the end of the previous buffer. Gate changes ramp from here.
    gate: f64,
}

/// Per buffer view of the shared parameters.
struct BufferState {
    accumulator: PhaseAccumulator,
    waveform: super::Waveform,
    volume: f64,
    stereo: StereoGains,
    gate_start: f64,
    gate_step: f64,
    gate_target: f64,
}

impl BufferState {
    #[inline]
    fn next_sample(&mut self, frame: usize) -> f64 {
        let phase = self.accumulator.next();
        let gate = self.gate_start + self.gate_step * (frame + 1) as f64;
        self.waveform.sample(phase) * self.volume * gate
    }
}

impl OscillatorCore {
    pub fn new(params: Arc<OscillatorParams>, sample_rate: u32) -> Self {
        Self {
            params,
            sample_rate,
            phase: 0.0,
            gate: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Phase the next rendered frame will start from.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn params(&self) -> &Arc<OscillatorParams> {
        &self.params
    }

    fn begin(&self, frames: usize) -> BufferState {
        let params = &self.params;
        let target_gate = params.output_gate();
        let gate_step = if frames == 0 {
            0.0
        } else {
            (target_gate - self.gate) / frames as f64
        };

        BufferState {
            accumulator: PhaseAccumulator::new_at(
                self.phase,
                params.frequency(),
                self.sample_rate,
            ),
            waveform: params.waveform(),
            volume: finite_or(params.volume(), 0.0),
            stereo: gains(finite_or(params.pan(), 0.0)),
            gate_start: self.gate,
            gate_step,
            gate_target: target_gate,
        }
    }

    fn finish(&mut self, state: BufferState, frames: usize) {
        self.phase = state.accumulator.phase();
        if frames > 0 {
            self.gate = state.gate_target;
        }
    }

    /// Fills an interleaved buffer (the layout cpal hands to output callbacks).
    ///
    /// Trailing samples that do not make a whole frame are left untouched.
    pub fn render_interleaved<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        if channels == 0 {
            return;
        }

        let frames = output.len() / channels;
        let mut state = self.begin(frames);

        for (index, frame) in output.chunks_exact_mut(channels).enumerate() {
            let value = state.next_sample(index);

            if channels == 1 {
                frame[0] = T::from_sample(value as f32);
            } else {
                let left = T::from_sample((value * state.stereo.left) as f32);
                let right = T::from_sample((value * state.stereo.right) as f32);
                frame[0] = left;
                for sample in frame[1..].iter_mut() {
                    *sample = right;
                }
            }
        }

        self.finish(state, frames);
    }

    /// Fills one buffer per channel. The frame count is the length of the shortest buffer.
    pub fn render_planar(&mut self, outputs: &mut [&mut [f32]]) {
        if outputs.is_empty() {
            return;
        }

        let frames = outputs.iter().map(|buffer| buffer.len()).min().unwrap_or(0);
        let mut state = self.begin(frames);

        for index in 0..frames {
            let value = state.next_sample(index);

            if outputs.len() == 1 {
                outputs[0][index] = value as f32;
            } else {
                let right = (value * state.stereo.right) as f32;
                outputs[0][index] = (value * state.stereo.left) as f32;
                for buffer in outputs[1..].iter_mut() {
                    buffer[index] = right;
                }
            }
        }

        self.finish(state, frames);
    }
}

// Setters store whatever they are given; render must never output NaN or infinities
#[inline]
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::Waveform;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn playing_core(sample_rate: u32) -> (Arc<OscillatorParams>, OscillatorCore) {
        let params = Arc::new(OscillatorParams::new());
        params.set_output_gate(true);
        let mut core = OscillatorCore::new(params.clone(), sample_rate);
        // Consume the fade in so the tests look at steady state output
        let mut warm_up = [0.0f32; 64];
        core.render_interleaved(&mut warm_up, 1);
        core.phase = 0.0;
        (params, core)
    }

    #[test]
    fn test_mono_writes_raw_samples() {
        let (params, mut core) = playing_core(48000);
        params.set_waveform(Waveform::Square);
        params.set_volume(0.5);
        params.set_pan(1.0);

        let mut buffer = [0.0f32; 8];
        core.render_interleaved(&mut buffer, 1);
        assert!(buffer.iter().all(|sample| *sample == 0.5));
    }

    #[test]
    fn test_stereo_panning() {
        let (params, mut core) = playing_core(48000);
        params.set_waveform(Waveform::Square);

        let mut buffer = [0.0f32; 8];
        core.render_interleaved(&mut buffer, 2);
        for frame in buffer.chunks(2) {
            assert!((frame[0] - FRAC_1_SQRT_2).abs() < 1e-6);
            assert!((frame[1] - FRAC_1_SQRT_2).abs() < 1e-6);
        }

        params.set_pan(-1.0);
        core.render_interleaved(&mut buffer, 2);
        for frame in buffer.chunks(2) {
            assert!((frame[0] - 1.0).abs() < 1e-6);
            assert!(frame[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_extra_channels_mirror_right() {
        let (params, mut core) = playing_core(48000);
        params.set_waveform(Waveform::Square);
        params.set_pan(0.5);

        let mut buffer = [0.0f32; 12];
        core.render_interleaved(&mut buffer, 4);
        for frame in buffer.chunks(4) {
            assert_eq!(frame[1], frame[2]);
            assert_eq!(frame[1], frame[3]);
            assert!(frame[1] > frame[0]);
        }
    }

    #[test]
    fn test_planar_matches_interleaved() {
        let (params, mut planar_core) = playing_core(48000);
        params.set_waveform(Waveform::Triangle);
        params.set_frequency(1000.0);
        params.set_pan(-0.3);
        let mut interleaved_core = OscillatorCore::new(params.clone(), 48000);
        interleaved_core.gate = 1.0;

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        planar_core.render_planar(&mut [&mut left[..], &mut right[..]]);

        let mut interleaved = [0.0f32; 128];
        interleaved_core.render_interleaved(&mut interleaved, 2);

        for (index, frame) in interleaved.chunks(2).enumerate() {
            assert_eq!(frame[0], left[index]);
            assert_eq!(frame[1], right[index]);
        }
        assert_eq!(planar_core.phase(), interleaved_core.phase());
    }

    #[test]
    fn test_phase_persists_across_buffers() {
        let (params, mut core) = playing_core(48000);
        params.set_frequency(480.0);

        let mut buffer = [0.0f32; 30];
        core.render_interleaved(&mut buffer, 1);
        assert!((core.phase() - 0.3).abs() < 1e-9);
        core.render_interleaved(&mut buffer, 1);
        assert!((core.phase() - 0.6).abs() < 1e-9);

        // Frequency changes apply from the next buffer without resetting the phase
        params.set_frequency(960.0);
        let mut buffer = [0.0f32; 10];
        core.render_interleaved(&mut buffer, 1);
        assert!((core.phase() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_gate_ramps_and_mutes() {
        let params = Arc::new(OscillatorParams::new());
        params.set_waveform(Waveform::Square);
        let mut core = OscillatorCore::new(params.clone(), 48000);

        let mut buffer = [1.0f32; 16];
        core.render_interleaved(&mut buffer, 1);
        assert!(buffer.iter().all(|sample| *sample == 0.0), "Output not muted");

        params.set_output_gate(true);
        core.render_interleaved(&mut buffer, 1);
        assert!(buffer[0] > 0.0 && buffer[0] < 1.0, "Fade in missing");
        assert!(buffer.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(buffer[15], 1.0);

        params.set_output_gate(false);
        core.render_interleaved(&mut buffer, 1);
        assert!(buffer[0] > 0.0 && buffer[0] < 1.0, "Fade out missing");
        assert_eq!(buffer[15], 0.0);

        core.render_interleaved(&mut buffer, 1);
        assert!(buffer.iter().all(|sample| *sample == 0.0), "Output not muted");
    }

    #[test]
    fn test_degenerate_buffers() {
        let (_params, mut core) = playing_core(48000);

        let mut empty: [f32; 0] = [];
        core.render_interleaved(&mut empty, 2);
        core.render_planar(&mut []);

        let mut buffer = [7.0f32; 5];
        core.render_interleaved(&mut buffer, 0);
        assert!(buffer.iter().all(|sample| *sample == 7.0));

        // Incomplete trailing frame is left alone
        core.render_interleaved(&mut buffer, 2);
        assert_eq!(buffer[4], 7.0);
        assert_eq!(core.phase(), PhaseAccumulator::new(440.0, 48000).advance(2));
    }

    #[test]
    fn test_non_finite_parameters() {
        let (params, mut core) = playing_core(48000);
        params.set_volume(f64::NAN);
        params.set_pan(f64::INFINITY);
        params.set_frequency(f64::NAN);

        let mut buffer = [1.0f32; 16];
        core.render_interleaved(&mut buffer, 2);
        assert!(buffer.iter().all(|sample| *sample == 0.0));
        assert_eq!(core.phase(), 0.0);

        params.set_volume(1.0);
        params.set_waveform(Waveform::Square);
        core.render_interleaved(&mut buffer, 2);
        assert!(buffer.iter().all(|sample| sample.is_finite() && *sample > 0.0));
    }

    #[test]
    fn test_integer_output() {
        let (params, mut core) = playing_core(48000);
        params.set_waveform(Waveform::Square);
        params.set_pan(-1.0);

        let mut buffer = [0i16; 4];
        core.render_interleaved(&mut buffer, 2);
        assert!(buffer[0] > i16::MAX - 2);
        assert_eq!(buffer[1], 0);
    }
}
