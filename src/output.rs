use crate::back_end::Channels;
use crate::error::EngineError;
use crate::oscillator::OscillatorCore;

/// Where rendered audio goes. Implementations acquire the platform audio resources and move
/// the [OscillatorCore] into whatever invokes the render callback.
///
/// The stream returned by [`open`](AudioOutput::open) keeps the callback alive; dropping it
/// tears everything down. Both calls only ever happen on the control thread.
pub trait AudioOutput {
    type Stream;

    /// Acquires the audio resources and starts pulling samples out of `core`.
    fn open(&mut self, core: OscillatorCore) -> Result<Self::Stream, EngineError>;

    /// Whether a stream opened earlier is still usable. A dead stream gets replaced on the next
    /// `play`.
    fn is_alive(&self, _stream: &Self::Stream) -> bool {
        true
    }
}

/// Output that renders on demand instead of following a hardware clock. Handy for headless
/// runs and for tests, which pull buffers through [OfflineStream::render].
pub struct OfflineOutput {
    channels: usize,
    failure: Option<EngineError>,
    opened: usize,
}

impl OfflineOutput {
    pub fn new(channels: Channels) -> Self {
        Self {
            channels: channels.get_amt() as usize,
            failure: None,
            opened: 0,
        }
    }

    /// An output whose every `open` fails with `error`, as an unavailable device would.
    pub fn failing(channels: Channels, error: EngineError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(channels)
        }
    }

    /// Makes the following `open` calls succeed again.
    pub fn recover(&mut self) {
        self.failure = None;
    }

    /// Amount of streams successfully opened so far.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl AudioOutput for OfflineOutput {
    type Stream = OfflineStream;

    fn open(&mut self, core: OscillatorCore) -> Result<OfflineStream, EngineError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.opened += 1;
        Ok(OfflineStream {
            core,
            channels: self.channels,
        })
    }
}

pub struct OfflineStream {
    core: OscillatorCore,
    channels: usize,
}

impl OfflineStream {
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn core(&self) -> &OscillatorCore {
        &self.core
    }

    /// Renders `frames` interleaved frames.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; frames * self.channels];
        self.core.render_interleaved(&mut buffer, self.channels);
        buffer
    }

    /// Renders into a caller provided interleaved buffer.
    pub fn render_into(&mut self, buffer: &mut [f32]) {
        self.core.render_interleaved(buffer, self.channels);
    }
}
