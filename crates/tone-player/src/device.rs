//! Output device access.
//!
//! [`AlsaPcm`] is the blocking ALSA playback handle implementing [`PcmBackend`].
//! Only built on Linux.
//!
//! [`PcmBackend`]: crate::backend::PcmBackend

#[cfg(target_os = "linux")]
pub use self::alsa_pcm::AlsaPcm;

#[cfg(target_os = "linux")]
mod alsa_pcm {
    use std::io;

    use alsa::pcm::{Access, HwParams, IoFormat, PCM};
    use alsa::{Direction, Output, ValueOr};

    use crate::backend::{
        DeviceError, HardwareProfile, HwParam, HwRequest, NegotiationError, PcmBackend,
        ResumeError, WriteError,
    };

    /// An ALSA PCM opened for blocking playback.
    pub struct AlsaPcm {
        pcm: PCM,
    }

    impl AlsaPcm {
        /// Open `device` (an ALSA PCM name such as `default` or `hw:0,0`) for playback.
        pub fn open(device: &str) -> Result<Self, DeviceError> {
            let pcm = PCM::new(device, Direction::Playback, false)
                .map_err(|e| device_error("snd_pcm_open", &e))?;
            tracing::debug!(device, "pcm opened");
            Ok(Self { pcm })
        }
    }

    impl PcmBackend for AlsaPcm {
        fn negotiate(&mut self, request: &HwRequest) -> Result<HardwareProfile, NegotiationError> {
            let hwp = HwParams::any(&self.pcm)
                .map_err(rejected(HwParam::Any, "snd_pcm_hw_params_any"))?;
            hwp.set_access(Access::RWInterleaved)
                .map_err(rejected(HwParam::Access, "snd_pcm_hw_params_set_access"))?;
            hwp.set_format(<i16 as IoFormat>::FORMAT)
                .map_err(rejected(HwParam::Format, "snd_pcm_hw_params_set_format"))?;
            hwp.set_channels(request.channels)
                .map_err(rejected(HwParam::Channels, "snd_pcm_hw_params_set_channels"))?;
            let rate_hz = hwp
                .set_rate_near(request.rate_hz, ValueOr::Nearest)
                .map_err(rejected(HwParam::Rate, "snd_pcm_hw_params_set_rate_near"))?;
            let buffer_time_us = hwp
                .set_buffer_time_near(request.buffer_time_us, ValueOr::Nearest)
                .map_err(rejected(
                    HwParam::BufferTime,
                    "snd_pcm_hw_params_set_buffer_time_near",
                ))?;
            let period_time_us = hwp
                .set_period_time_near(request.period_time_us, ValueOr::Nearest)
                .map_err(rejected(
                    HwParam::PeriodTime,
                    "snd_pcm_hw_params_set_period_time_near",
                ))?;
            self.pcm
                .hw_params(&hwp)
                .map_err(rejected(HwParam::Install, "snd_pcm_hw_params"))?;

            let period_size = hwp
                .get_period_size()
                .map_err(rejected(HwParam::PeriodSize, "snd_pcm_hw_params_get_period_size"))?;
            let period_frames =
                usize::try_from(period_size).map_err(|_| NegotiationError::Unusable {
                    param: HwParam::PeriodSize,
                    value: i64::from(period_size),
                })?;

            Ok(HardwareProfile {
                rate_hz,
                period_time_us,
                buffer_time_us,
                period_frames,
            })
        }

        fn write(&mut self, frames: &[i16]) -> Result<usize, WriteError> {
            let io = self
                .pcm
                .io_i16()
                .map_err(|e| WriteError::Fatal(device_error("snd_pcm_writei", &e)))?;
            io.writei(frames).map_err(|e| match classify_write(e.errno()) {
                WriteError::Fatal(_) => WriteError::Fatal(device_error("snd_pcm_writei", &e)),
                transient => transient,
            })
        }

        fn prepare(&mut self) -> Result<(), DeviceError> {
            self.pcm
                .prepare()
                .map_err(|e| device_error("snd_pcm_prepare", &e))
        }

        fn resume(&mut self) -> Result<(), ResumeError> {
            self.pcm.resume().map_err(|e| match classify_resume(e.errno()) {
                ResumeError::Fatal(_) => ResumeError::Fatal(device_error("snd_pcm_resume", &e)),
                not_yet => not_yet,
            })
        }

        fn dump(&self, out: &mut dyn io::Write) -> io::Result<()> {
            let mut buf = Output::buffer_open().map_err(io::Error::other)?;
            self.pcm.dump(&mut buf).map_err(io::Error::other)?;
            write!(out, "{buf}")
        }
    }

    fn device_error(op: &'static str, err: &alsa::Error) -> DeviceError {
        DeviceError::with_description(op, err.errno(), err.to_string())
    }

    fn rejected(param: HwParam, op: &'static str) -> impl Fn(alsa::Error) -> NegotiationError {
        move |e| NegotiationError::rejected(param, device_error(op, &e))
    }

    pub(super) fn classify_write(errno: i32) -> WriteError {
        match errno {
            libc::EAGAIN => WriteError::Busy,
            libc::EPIPE => WriteError::Underrun,
            libc::ESTRPIPE => WriteError::Suspended,
            other => WriteError::Fatal(DeviceError::from_errno("snd_pcm_writei", other)),
        }
    }

    pub(super) fn classify_resume(errno: i32) -> ResumeError {
        match errno {
            libc::EAGAIN => ResumeError::NotYet,
            other => ResumeError::Fatal(DeviceError::from_errno("snd_pcm_resume", other)),
        }
    }
}
