use std::time::Duration;

/// ALSA device used when none is given.
pub const DEFAULT_DEVICE: &str = "default";
/// Tone frequency used when none is given.
pub const DEFAULT_FREQUENCY_HZ: f64 = 440.0;
/// Sample rate requested when none is given.
pub const DEFAULT_RATE_HZ: u32 = 44_100;

/// Requested hardware period. One period is also the length of the looped clip.
pub const PERIOD_TIME_US: u32 = 1_000_000;
/// Requested device buffer, in periods.
pub const BUFFER_PERIODS: u32 = 3;
/// Output is always mono.
pub const CHANNELS: u32 = 1;
/// Delay between resume attempts while the stream is suspended.
pub const RESUME_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tone playback settings, fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackConfig {
    device: String,
    rate_hz: u32,
    frequency_hz: f64,
    verbose: bool,
}

impl PlaybackConfig {
    pub fn new(device: impl Into<String>, rate_hz: u32, frequency_hz: f64, verbose: bool) -> Self {
        Self {
            device: device.into(),
            rate_hz,
            frequency_hz,
            verbose,
        }
    }

    /// ALSA device identifier, e.g. `default` or `hw:0,0`.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Requested sample rate. The device may settle on a different one.
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Requested tone frequency before quantization.
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Whether to dump the negotiated device setup to stderr.
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE, DEFAULT_RATE_HZ, DEFAULT_FREQUENCY_HZ, false)
    }
}
