use std::thread::sleep;
use std::time::Duration;

// DEBUGGING, LOGGING
use simplelog::__private::paris::Logger;
use simplelog::*;

// MY STUFF
use sound_generator::back_end::CpalOutput;
use sound_generator::{EngineConfig, MethodCall, SoundGenerator};

const DEMO_CONFIG: &str = "
version: 0.1
sample-rate: 48000
channels: stereo
log-level: info
";

// (method, arguments, milliseconds to wait afterwards)
const DEMO_SCRIPT: [(&str, &str, u64); 12] = [
    ("init", "{sampleRate: 48000}", 0),
    ("setVolume", "{volume: 0.3}", 0),
    ("setFrequency", "{frequency: 440}", 0),
    ("play", "", 700),
    ("setWaveform", "{waveType: TRIANGLE}", 700),
    ("setWaveform", "{waveType: SQUAREWAVE}", 0),
    ("setDecibel", "{decibel: -24}", 700),
    ("setWaveform", "{waveType: SAWTOOTH}", 0),
    ("setBalance", "{balance: -1.0}", 500),
    ("setBalance", "{balance: 1.0}", 500),
    ("stop", "", 300),
    ("release", "", 0),
];

fn main() -> Result<(), anyhow::Error> {
    let config = EngineConfig::from_yaml_str(DEMO_CONFIG)?;

    // LOGGER INIT
    TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    let mut logger = Logger::new();

    info!("<b>Running <blue>demo program</>");

    let mut generator = SoundGenerator::new(CpalOutput::new(&config), config);
    let playing = generator.on_change_is_playing.listen();

    logger.loading("<blue><info></><b> Playing sound</>");
    for (method, arguments, wait) in DEMO_SCRIPT {
        let reply = generator.handle(&MethodCall::parse(method, arguments))?;
        debug!("{} -> {:?}", method, reply);

        for is_playing in playing.try_iter() {
            info!("<b>onChangeIsPlaying: <cyan>{}</>", is_playing);
        }

        if wait > 0 {
            sleep(Duration::from_millis(wait));
        }
    }
    logger.done();

    info!("<green><tick></> <b>Program finished <green>successfully</>");
    Ok(())
}
