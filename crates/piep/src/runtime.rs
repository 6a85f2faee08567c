//! Process runtime.
//!
//! Parses arguments, installs logging, opens the output device and plays the tone.
//! Every outcome is mapped to a process exit code here; nothing below this layer
//! terminates the process.

use std::ffi::OsString;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tone_player::backend::{DeviceError, PcmBackend};
use tone_player::config::PlaybackConfig;
use tone_player::pipeline;
use tone_player::playback::PlaybackOptions;
use tone_player::status::PlaybackStats;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::playback_config;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Run against the platform ALSA backend.
pub fn run<I, T>(argv: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_with(argv, open_platform_backend)
}

/// Run with a caller-supplied device opener.
///
/// Returns `0` only for `-h`. Argument errors return `1` before `open` is called;
/// fatal device errors return `1` after a single diagnostic line on stderr.
pub fn run_with<I, T, B, F>(argv: I, open: F) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    B: PcmBackend,
    F: FnOnce(&str) -> Result<B, DeviceError>,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) => return report_usage_error(&err),
    };
    init_tracing(args.verbose);

    let config = playback_config(&args);
    exit_code(run_tone(&config, open))
}

/// Open the device and play until a fatal error.
pub fn run_tone<B, F>(config: &PlaybackConfig, open: F) -> Result<()>
where
    B: PcmBackend,
    F: FnOnce(&str) -> Result<B, DeviceError>,
{
    let mut backend = open(config.device())
        .with_context(|| format!("open playback device {}", config.device()))?;
    tracing::info!(device = config.device(), "output device");

    let stats = PlaybackStats::shared();
    let opts = PlaybackOptions {
        stats: Some(stats.clone()),
        ..PlaybackOptions::default()
    };
    let result = pipeline::play_tone(&mut backend, config, &opts);
    tracing::debug!(stats = ?stats.snapshot(), "playback stopped");
    result
}

fn exit_code(result: Result<()>) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("piep: {e:#}");
            EXIT_FAILURE
        }
    }
}

fn report_usage_error(err: &clap::Error) -> u8 {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}

#[cfg(target_os = "linux")]
fn open_platform_backend(device: &str) -> Result<tone_player::device::AlsaPcm, DeviceError> {
    tone_player::device::AlsaPcm::open(device)
}

#[cfg(not(target_os = "linux"))]
fn open_platform_backend(_device: &str) -> Result<unsupported::NoBackend, DeviceError> {
    Err(DeviceError {
        op: "snd_pcm_open",
        code: 0,
        description: "ALSA playback is only available on Linux".to_string(),
    })
}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use tone_player::backend::{
        DeviceError, HardwareProfile, HwRequest, NegotiationError, PcmBackend, ResumeError,
        WriteError,
    };

    /// Stands in for the ALSA backend where none exists; cannot be constructed.
    pub enum NoBackend {}

    impl PcmBackend for NoBackend {
        fn negotiate(&mut self, _: &HwRequest) -> Result<HardwareProfile, NegotiationError> {
            match *self {}
        }

        fn write(&mut self, _: &[i16]) -> Result<usize, WriteError> {
            match *self {}
        }

        fn prepare(&mut self) -> Result<(), DeviceError> {
            match *self {}
        }

        fn resume(&mut self) -> Result<(), ResumeError> {
            match *self {}
        }
    }
}
