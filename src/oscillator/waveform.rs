use std::f64::consts::PI;

/// The shapes the oscillator is able to generate.
///
/// The discriminant is the selector stored in the shared parameter block, so it must stay
/// stable. Any selector outside of the known range decodes to [Waveform::Sine].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Waveform {
    #[default]
    Sine = 0,
    Square = 1,
    Triangle = 2,
    Sawtooth = 3,
}

impl Waveform {
    /// Decodes a raw selector. Never fails: unknown values fall back to a sine.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Square,
            2 => Self::Triangle,
            3 => Self::Sawtooth,
            _ => Self::Sine,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Decodes the wave type names used by the method channel
    /// (`SINUSOIDAL`, `SQUAREWAVE`, `TRIANGLE`, `SAWTOOTH`).
    pub fn from_wave_type(wave_type: &str) -> Self {
        match wave_type {
            "SQUAREWAVE" => Self::Square,
            "TRIANGLE" => Self::Triangle,
            "SAWTOOTH" => Self::Sawtooth,
            _ => Self::Sine,
        }
    }

    pub fn wave_type(self) -> &'static str {
        match self {
            Self::Sine => "SINUSOIDAL",
            Self::Square => "SQUAREWAVE",
            Self::Triangle => "TRIANGLE",
            Self::Sawtooth => "SAWTOOTH",
        }
    }

    /// Maps a phase in `[0, 1)` to a sample in `[-1, 1]`.
    ///
    /// Pure and allocation free, so it is safe to call from the render callback.
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Self::Sine => phase.sine(),
            Self::Square => phase.sqr(),
            Self::Triangle => phase.tri(),
            Self::Sawtooth => phase.saw(),
        }
    }
}

/// Waveform math over a normalized phase (one cycle spans `[0, 1)`).
pub trait OscillatorMath {
    fn sine(&self) -> Self;
    fn sqr(&self) -> Self;
    fn tri(&self) -> Self;
    fn saw(&self) -> Self;
}

impl OscillatorMath for f64 {
    fn sine(&self) -> Self {
        (*self * 2.0 * PI).sin()
    }

    // 50% duty cycle, no band limiting
    fn sqr(&self) -> Self {
        if *self < 0.5 {
            1.0
        } else {
            -1.0
        }
    }

    fn tri(&self) -> Self {
        if *self < 0.25 {
            *self * 4.0
        } else if *self < 0.75 {
            2.0 - *self * 4.0
        } else {
            *self * 4.0 - 4.0
        }
    }

    fn saw(&self) -> Self {
        2.0 * *self - 1.0
    }
}

/// Generates exactly one period of `waveform` at the given frequency and sample rate, scaled
/// by `volume`. Used to feed waveform previews; it allocates, so never call it from render.
///
/// Returns an empty vector when the period is not representable (non positive frequency or
/// sample rate). Periods longer than one second are resampled down to `sample_rate` frames.
pub fn one_cycle(waveform: Waveform, frequency: f64, sample_rate: u32, volume: f64) -> Vec<f64> {
    if frequency <= 0.0 || sample_rate == 0 {
        return Vec::new();
    }

    let length = (sample_rate as f64 / frequency)
        .round()
        .clamp(1.0, sample_rate as f64) as usize;

    (0..length)
        .map(|frame| waveform.sample(frame as f64 / length as f64) * volume)
        .collect()
}
