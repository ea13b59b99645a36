// This files contains the cpal back-end: device lookup, config negotiation and the stream that
// drives an OscillatorCore from the audio thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, FromSample, Host, SampleFormat, SampleRate, SizedSample, StreamConfig,
    SupportedStreamConfig, SupportedStreamConfigRange,
};
use simplelog::{debug, error, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::oscillator::OscillatorCore;
use crate::output::AudioOutput;

/// Looks up for a supported config able to run at the requested sample rate.
///
/// # Arguments
/// * `device` - a `Device` from which to get the **supported configurations**.
/// * `channel_amt` - the amount of channels to look for. Ranges with the exact count win,
/// wider ranges are accepted otherwise.
/// * `sample_format` - (optional) a `SampleFormat` with the **preferred format** for each
/// **sample**. Other formats are still accepted when it is not available.
/// * `sample_rate` - the sample rate the oscillator renders at.
///
/// # Return
/// The best `SupportedStreamConfig` fulfilling the requirements from the arguments.
pub fn get_preferred_config(
    device: &Device,
    channel_amt: &Channels,
    sample_format: Option<SampleFormat>,
    sample_rate: SampleRate,
) -> Result<SupportedStreamConfig, EngineError> {
    let config = query_config(device, channel_amt, sample_format, sample_rate)?;

    debug!(
        "PREFERRED CONFIG for {}",
        device.name().unwrap_or_else(|_| "<unnamed device>".to_string())
    );
    debug!(" |_ channels: {}", config.channels());
    debug!(" |_ sample_rate: {}", config.sample_rate().0);
    debug!(" |_ buffer size: {:?}", config.buffer_size());
    debug!(" |_ sample format: {:?}", config.sample_format());

    Ok(config)
}

pub fn query_configurations(
    device: &Device,
    sample_rate: SampleRate,
) -> Result<Vec<SupportedStreamConfigRange>, EngineError> {
    let supported_configs = device
        .supported_output_configs()
        .map_err(|err| EngineError::new("Unable to query output configurations", err))?
        // Check the sample rate
        .filter(|config| {
            config.min_sample_rate() <= sample_rate && sample_rate <= config.max_sample_rate()
        })
        // to vector
        .collect::<Vec<SupportedStreamConfigRange>>();

    for item in supported_configs.iter() {
        debug!("  |_ {:?}", item);
    }

    Ok(supported_configs)
}

pub fn query_config(
    device: &Device,
    channel_amt: &Channels,
    sample_format: Option<SampleFormat>,
    sample_rate: SampleRate,
) -> Result<SupportedStreamConfig, EngineError> {
    let wanted_channels = channel_amt.get_amt() as u16;

    let range = query_configurations(device, sample_rate)?
        .into_iter()
        .filter(|config| config.channels() > 0)
        .min_by_key(|config| {
            let channel_rank = if config.channels() == wanted_channels {
                0
            } else if config.channels() > wanted_channels {
                1
            } else {
                2
            };
            let format_rank = match sample_format {
                Some(format) if format == config.sample_format() => 0,
                _ => 1,
            };
            (channel_rank, format_rank)
        })
        .ok_or_else(|| {
            EngineError::new(
                "No possible configuration could be found",
                format!("no output range supports {} Hz", sample_rate.0),
            )
        })?;

    Ok(range.with_sample_rate(sample_rate))
}

fn find_device(host: &Host, name: Option<&str>) -> Result<Device, EngineError> {
    match name {
        None => host.default_output_device().ok_or_else(|| {
            EngineError::new(
                "Unable to start audio engine",
                "no default output device available",
            )
        }),
        Some(wanted) => host
            .output_devices()
            .map_err(|err| EngineError::new("Unable to enumerate output devices", err))?
            .find(|device| device.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| {
                EngineError::new(
                    "Unable to start audio engine",
                    format!("output device '{}' not found", wanted),
                )
            }),
    }
}

/// An enumeration for specifying an amount of channels and easily differentiate the most common cases (mono and stereo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// A single channel
    Mono,
    /// Two channels
    Stereo,
    /// Any given amount of channels
    Multi(u8),
}

impl Channels {
    /// Translates the `enum` to a value for ease.
    /// # Example
    /// ```
    /// use sound_generator::back_end::Channels;
    ///
    /// let x: u8 = Channels::Stereo.get_amt(); // returns 2
    /// assert_eq!(x, 2);
    /// ```
    pub fn get_amt(&self) -> u8 {
        match *self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Multi(x) => x,
        }
    }
}

/// Plays the oscillator through the host's output device using cpal.
pub struct CpalOutput {
    channels: Channels,
    buffer_frames: Option<u32>,
    device_name: Option<String>,
}

/// A live cpal stream. Dropping it tears the audio callback down.
pub struct CpalStream {
    _stream: cpal::Stream,
    config: StreamConfig,
    failed: Arc<AtomicBool>,
}

impl CpalStream {
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl CpalOutput {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            channels: config.channels,
            buffer_frames: config.buffer_frames,
            device_name: config.device_name.clone(),
        }
    }
}

impl AudioOutput for CpalOutput {
    type Stream = CpalStream;

    fn open(&mut self, core: OscillatorCore) -> Result<CpalStream, EngineError> {
        let host = cpal::default_host();
        let device = find_device(&host, self.device_name.as_deref())?;

        let supported = get_preferred_config(
            &device,
            &self.channels,
            Some(SampleFormat::F32),
            SampleRate(core.sample_rate()),
        )?;

        let sample_format = supported.sample_format();
        let mut config: StreamConfig = supported.into();
        if let Some(frames) = self.buffer_frames {
            config.buffer_size = BufferSize::Fixed(frames);
        }

        let failed = Arc::new(AtomicBool::new(false));
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, core, failed.clone()),
            SampleFormat::F64 => build_stream::<f64>(&device, &config, core, failed.clone()),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, core, failed.clone()),
            SampleFormat::I32 => build_stream::<i32>(&device, &config, core, failed.clone()),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, core, failed.clone()),
            SampleFormat::U8 => build_stream::<u8>(&device, &config, core, failed.clone()),
            other => Err(EngineError::new(
                "Unsupported sample format",
                format!("{:?}", other),
            )),
        }?;

        stream
            .play()
            .map_err(|err| EngineError::new("Unable to start audio engine", err))?;

        info!(
            "<b>Output stream <green>running</><b>: {} Hz, {} channels, {:?}</>",
            config.sample_rate.0, config.channels, sample_format
        );

        Ok(CpalStream {
            _stream: stream,
            config,
            failed,
        })
    }

    fn is_alive(&self, stream: &CpalStream) -> bool {
        !stream.failed.load(Ordering::Relaxed)
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut core: OscillatorCore,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, EngineError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;

    let err_fn = move |err: cpal::StreamError| {
        error!("<b>An error occurred on the output stream: <red>{}</>", err);
        failed.store(true, Ordering::Relaxed);
    };

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                core.render_interleaved(data, channels)
            },
            err_fn,
            None,
        )
        .map_err(|err| EngineError::new("Unable to build output stream", err))
}
