//! Scripted in-memory backend.
//!
//! Plays back a fixed script of write/resume outcomes and records every call, so the
//! negotiation and recovery paths can be exercised without audio hardware.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{
    DeviceError, HardwareProfile, HwParam, HwRequest, NegotiationError, PcmBackend, ResumeError,
    WriteError,
};

/// Outcome of one scripted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockWrite {
    /// Accept every offered frame.
    Accept,
    /// Accept at most this many frames.
    Partial(usize),
    Busy,
    Underrun,
    Suspended,
    /// Fail with this errno.
    Fatal(i32),
}

/// Outcome of one scripted resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResume {
    Ready,
    NotYet,
    Fatal(i32),
}

/// Everything the backend was asked to do, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockCalls {
    pub negotiations: Vec<HwRequest>,
    /// Frames offered on each write.
    pub writes: Vec<usize>,
    pub prepares: usize,
    pub resumes: usize,
}

#[derive(Debug)]
pub struct MockBackend {
    profile: HardwareProfile,
    reject: Option<HwParam>,
    writes: VecDeque<MockWrite>,
    resumes: VecDeque<MockResume>,
    prepare_errno: Option<i32>,
    cancel_when_drained: Option<Arc<AtomicBool>>,
    calls: MockCalls,
}

impl MockBackend {
    /// A backend that agrees to `profile` whatever is requested.
    pub fn new(profile: HardwareProfile) -> Self {
        Self {
            profile,
            reject: None,
            writes: VecDeque::new(),
            resumes: VecDeque::new(),
            prepare_errno: None,
            cancel_when_drained: None,
            calls: MockCalls::default(),
        }
    }

    /// Fail negotiation on `param` with `EINVAL`.
    pub fn rejecting(mut self, param: HwParam) -> Self {
        self.reject = Some(param);
        self
    }

    pub fn with_writes(mut self, script: impl IntoIterator<Item = MockWrite>) -> Self {
        self.writes.extend(script);
        self
    }

    /// Resume outcomes; once exhausted, resume succeeds.
    pub fn with_resumes(mut self, script: impl IntoIterator<Item = MockResume>) -> Self {
        self.resumes.extend(script);
        self
    }

    pub fn failing_prepare(mut self, errno: i32) -> Self {
        self.prepare_errno = Some(errno);
        self
    }

    /// Once the write script runs out, accept the next write and raise `cancel`.
    ///
    /// Without this, a write past the end of the script fails with `EIO`.
    pub fn cancel_when_drained(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel_when_drained = Some(cancel);
        self
    }

    pub fn calls(&self) -> &MockCalls {
        &self.calls
    }
}

impl PcmBackend for MockBackend {
    fn negotiate(&mut self, request: &HwRequest) -> Result<HardwareProfile, NegotiationError> {
        self.calls.negotiations.push(*request);
        match self.reject {
            Some(param) => Err(NegotiationError::rejected(
                param,
                DeviceError::from_errno("mock_hw_params", libc::EINVAL),
            )),
            None => Ok(self.profile),
        }
    }

    fn write(&mut self, frames: &[i16]) -> Result<usize, WriteError> {
        self.calls.writes.push(frames.len());
        let Some(step) = self.writes.pop_front() else {
            return match &self.cancel_when_drained {
                Some(cancel) => {
                    cancel.store(true, Ordering::Relaxed);
                    Ok(frames.len())
                }
                None => Err(DeviceError::from_errno("snd_pcm_writei", libc::EIO).into()),
            };
        };
        match step {
            MockWrite::Accept => Ok(frames.len()),
            MockWrite::Partial(n) => Ok(n.min(frames.len())),
            MockWrite::Busy => Err(WriteError::Busy),
            MockWrite::Underrun => Err(WriteError::Underrun),
            MockWrite::Suspended => Err(WriteError::Suspended),
            MockWrite::Fatal(errno) => Err(DeviceError::from_errno("snd_pcm_writei", errno).into()),
        }
    }

    fn prepare(&mut self) -> Result<(), DeviceError> {
        self.calls.prepares += 1;
        match self.prepare_errno {
            Some(errno) => Err(DeviceError::from_errno("snd_pcm_prepare", errno)),
            None => Ok(()),
        }
    }

    fn resume(&mut self) -> Result<(), ResumeError> {
        self.calls.resumes += 1;
        match self.resumes.pop_front().unwrap_or(MockResume::Ready) {
            MockResume::Ready => Ok(()),
            MockResume::NotYet => Err(ResumeError::NotYet),
            MockResume::Fatal(errno) => {
                Err(DeviceError::from_errno("snd_pcm_resume", errno).into())
            }
        }
    }

    fn dump(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(
            out,
            "mock pcm: rate {} Hz, period {} frames",
            self.profile.rate_hz, self.profile.period_frames
        )
    }
}
