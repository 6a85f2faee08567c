use clap::Parser;

use tone_player::config::{DEFAULT_DEVICE, DEFAULT_FREQUENCY_HZ, DEFAULT_RATE_HZ};

#[derive(Parser, Debug)]
#[command(name = "piep", about = "Play an infinite sine wave tone through ALSA")]
pub struct Args {
    /// ALSA device name for playback
    #[arg(short = 'd', long, value_name = "DEVICE", default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Tone frequency in Hz (rounded so a whole number of cycles fits one period)
    #[arg(
        short = 'f',
        long = "frequency",
        value_name = "FREQ",
        default_value_t = DEFAULT_FREQUENCY_HZ,
        value_parser = parse_frequency
    )]
    pub frequency_hz: f64,

    /// Output sample rate in Hz (the device may pick the nearest supported rate)
    #[arg(
        short = 'r',
        long = "rate",
        value_name = "RATE",
        default_value_t = DEFAULT_RATE_HZ,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub rate_hz: u32,

    /// Enable verbose output on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn parse_frequency(s: &str) -> Result<f64, String> {
    let hz: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid float: {s}"))?;
    if !hz.is_finite() || hz < 0.0 {
        return Err(format!("expected a finite, non-negative frequency: {s}"));
    }
    Ok(hz)
}
