//! Audio backend capability contract.
//!
//! The rest of the crate only talks to the device through [`PcmBackend`]:
//! - hardware parameter negotiation
//! - blocking interleaved writes
//! - `prepare` after an underrun and `resume` after a suspend
//!
//! Errors are classified here so the playback loop can tell transient conditions
//! (busy, underrun, suspend) from fatal ones without knowing about errno values.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::config::{BUFFER_PERIODS, CHANNELS, PERIOD_TIME_US, PlaybackConfig};

/// A device operation failed in a way the caller cannot recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op}: {description}")]
pub struct DeviceError {
    /// Name of the failing backend call, e.g. `snd_pcm_writei`.
    pub op: &'static str,
    /// Positive errno reported by the device.
    pub code: i32,
    pub description: String,
}

/// First of the ALSA-private error codes that sit above the errno range.
pub const SND_ERROR_BEGIN: i32 = 500_000;
pub const SND_ERROR_INCOMPATIBLE_VERSION: i32 = SND_ERROR_BEGIN;
pub const SND_ERROR_ALISP_NIL: i32 = SND_ERROR_BEGIN + 1;

impl DeviceError {
    /// Build an error from a positive errno value, or one of the `SND_ERROR_*` codes.
    pub fn from_errno(op: &'static str, code: i32) -> Self {
        Self::with_description(op, code, describe_code(code))
    }

    /// Build an error whose text was already produced by the device layer.
    pub fn with_description(op: &'static str, code: i32, description: impl Into<String>) -> Self {
        Self {
            op,
            code,
            description: description.into(),
        }
    }
}

fn describe_code(code: i32) -> String {
    match code {
        SND_ERROR_INCOMPATIBLE_VERSION => "Sound protocol is not compatible".to_string(),
        SND_ERROR_ALISP_NIL => "Lisp encountered an error".to_string(),
        c if c >= SND_ERROR_BEGIN => format!("Unknown ALSA error {c}"),
        c => io::Error::from_raw_os_error(c).to_string(),
    }
}

/// Outcome of a write that did not transfer any frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Device could not accept data right now.
    #[error("device busy")]
    Busy,
    /// Device buffer ran dry before new data arrived.
    #[error("buffer underrun")]
    Underrun,
    /// Stream suspended, typically by a system power event.
    #[error("stream suspended")]
    Suspended,
    #[error(transparent)]
    Fatal(#[from] DeviceError),
}

/// Outcome of a failed resume attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResumeError {
    /// Device is still suspended; try again later.
    #[error("resume not ready yet")]
    NotYet,
    #[error(transparent)]
    Fatal(#[from] DeviceError),
}

/// Hardware parameter touched during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwParam {
    /// Initial full configuration space.
    Any,
    Access,
    Format,
    Channels,
    Rate,
    BufferTime,
    PeriodTime,
    /// Installing the refined configuration on the device.
    Install,
    PeriodSize,
}

impl fmt::Display for HwParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HwParam::Any => "hardware configuration space",
            HwParam::Access => "access type",
            HwParam::Format => "sample format",
            HwParam::Channels => "channel count",
            HwParam::Rate => "sample rate",
            HwParam::BufferTime => "buffer time",
            HwParam::PeriodTime => "period time",
            HwParam::Install => "hardware parameters",
            HwParam::PeriodSize => "period size",
        };
        f.write_str(name)
    }
}

/// The device refused the requested setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("device rejected {param}")]
    Rejected {
        param: HwParam,
        #[source]
        source: DeviceError,
    },
    #[error("device settled on unusable {param} ({value})")]
    Unusable { param: HwParam, value: i64 },
}

impl NegotiationError {
    pub fn rejected(param: HwParam, source: DeviceError) -> Self {
        Self::Rejected { param, source }
    }

    /// The parameter the device objected to.
    pub fn param(&self) -> HwParam {
        match self {
            Self::Rejected { param, .. } | Self::Unusable { param, .. } => *param,
        }
    }
}

/// Parameters asked of the device. Every time/rate field is a request; the device
/// answers with the nearest value it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwRequest {
    pub channels: u32,
    pub rate_hz: u32,
    pub period_time_us: u32,
    pub buffer_time_us: u32,
}

impl HwRequest {
    /// Fixed mono, one-second-period policy at the configured rate.
    pub fn for_config(config: &PlaybackConfig) -> Self {
        Self {
            channels: CHANNELS,
            rate_hz: config.rate_hz(),
            period_time_us: PERIOD_TIME_US,
            buffer_time_us: PERIOD_TIME_US * BUFFER_PERIODS,
        }
    }
}

/// What the device actually agreed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareProfile {
    pub rate_hz: u32,
    pub period_time_us: u32,
    pub buffer_time_us: u32,
    /// Frames per hardware period, as reported by the device.
    pub period_frames: usize,
}

impl HardwareProfile {
    /// Length of one period in seconds, derived from the frame count and rate.
    pub fn period_secs(&self) -> f64 {
        self.period_frames as f64 / f64::from(self.rate_hz)
    }
}

/// A mono S16 output stream.
///
/// Writes are blocking: `write` returns once the device has taken the data, which is
/// the only pacing the playback loop relies on.
pub trait PcmBackend {
    /// Negotiate hardware parameters and install them on the device.
    fn negotiate(&mut self, request: &HwRequest) -> Result<HardwareProfile, NegotiationError>;

    /// Write interleaved frames; returns how many frames the device accepted.
    fn write(&mut self, frames: &[i16]) -> Result<usize, WriteError>;

    /// Bring the stream back to the prepared state.
    fn prepare(&mut self) -> Result<(), DeviceError>;

    /// Resume a suspended stream.
    fn resume(&mut self) -> Result<(), ResumeError>;

    /// Write a human-readable description of the device setup.
    fn dump(&self, _out: &mut dyn io::Write) -> io::Result<()> {
        Ok(())
    }
}
