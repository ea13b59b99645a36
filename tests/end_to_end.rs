use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use sound_generator::back_end::Channels;
use sound_generator::oscillator::{OscillatorCore, OscillatorParams, Waveform};
use sound_generator::output::OfflineOutput;
use sound_generator::{EngineConfig, MethodCall, Reply, SoundGenerator};

fn dispatch(generator: &mut SoundGenerator<OfflineOutput>, method: &str, arguments: &str) -> Reply {
    generator
        .handle(&MethodCall::parse(method, arguments))
        .unwrap_or_else(|err| panic!("{} failed: {}", method, err))
}

#[test]
fn test_one_second_of_a_440_hz_sine() {
    let mut generator =
        SoundGenerator::new(OfflineOutput::new(Channels::Mono), EngineConfig::default());
    let events = generator.on_change_is_playing.listen();

    assert_eq!(dispatch(&mut generator, "init", "{sampleRate: 48000}"), Reply::Bool(true));
    dispatch(&mut generator, "setFrequency", "{frequency: 440}");
    dispatch(&mut generator, "setWaveform", "{waveType: SINUSOIDAL}");
    dispatch(&mut generator, "play", "");
    assert_eq!(events.try_recv(), Ok(true));

    let stream = generator.stream_mut().expect("play did not open a stream");

    // Pull the second in cpal-sized chunks and count how often the phase wraps
    let mut wraps = 0;
    let mut previous_phase = stream.core().phase();
    let mut rising_crossings = 0;
    let mut previous_sample = 0.0f32;
    let mut buffer = [0.0f32; 480];
    for _ in 0..100 {
        for frame in 0..buffer.len() {
            stream.render_into(&mut buffer[frame..frame + 1]);
            let phase = stream.core().phase();
            if phase < previous_phase {
                wraps += 1;
            }
            previous_phase = phase;

            let sample = buffer[frame];
            if previous_sample < 0.0 && sample >= 0.0 {
                rising_crossings += 1;
            }
            previous_sample = sample;
        }
    }

    let cycles = wraps as f64 + stream.core().phase();
    assert!(
        (cycles - 440.0).abs() < 1e-6,
        "Expected 440 cycles, got {} wraps and a phase of {}",
        wraps,
        stream.core().phase()
    );
    assert!(
        (439..=440).contains(&rising_crossings),
        "Unexpected zero crossings: {}",
        rising_crossings
    );
}

#[test]
fn test_stereo_balance_through_method_calls() {
    let mut generator =
        SoundGenerator::new(OfflineOutput::new(Channels::Stereo), EngineConfig::default());
    dispatch(&mut generator, "init", "{sampleRate: 48000}");
    dispatch(&mut generator, "setWaveform", "{waveType: SQUAREWAVE}");
    dispatch(&mut generator, "setFrequency", "{frequency: 10}");
    dispatch(&mut generator, "setBalance", "{balance: 1}");
    dispatch(&mut generator, "play", "");

    let stream = generator.stream_mut().unwrap();
    let _fade_in = stream.render(256);
    let buffer = stream.render(256);
    for frame in buffer.chunks(2) {
        assert!(frame[0].abs() < 1e-6, "Left channel not silent: {}", frame[0]);
        assert!((frame[1] - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_release_then_play_renders_again() {
    let mut generator =
        SoundGenerator::new(OfflineOutput::new(Channels::Stereo), EngineConfig::default());
    let events = generator.on_change_is_playing.listen();

    dispatch(&mut generator, "init", "{sampleRate: 32000}");
    dispatch(&mut generator, "play", "");
    dispatch(&mut generator, "release", "");
    dispatch(&mut generator, "play", "");

    assert_eq!(generator.sample_rate(), 32000);
    let buffer = generator.stream_mut().unwrap().render(1024);
    assert!(buffer.iter().any(|sample| *sample != 0.0));
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![true, false, true]);
}

#[test]
fn test_concurrent_parameter_changes() {
    let params = Arc::new(OscillatorParams::new());
    params.set_output_gate(true);
    let mut core = OscillatorCore::new(params.clone(), 48000);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let params = params.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut step = 0u32;
            while !done.load(Ordering::Relaxed) {
                let t = (step % 1000) as f64 / 1000.0;
                params.set_frequency(20.0 + t * 19980.0);
                params.set_volume(t);
                params.set_pan(t * 2.0 - 1.0);
                params.set_waveform(Waveform::from_index((step % 5) as u8));
                step = step.wrapping_add(1);
            }
        })
    };

    let mut buffer = [0.0f32; 256];
    for _ in 0..2000 {
        core.render_interleaved(&mut buffer, 2);
        assert!(buffer
            .iter()
            .all(|sample| sample.is_finite() && sample.abs() <= 1.0));
        assert!((0.0..1.0).contains(&core.phase()));
    }

    done.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}
