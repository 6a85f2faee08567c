use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the playback loop.
///
/// Recoverable device conditions are never surfaced to the user; these counters are
/// the only record of them.
#[derive(Debug, Default)]
pub struct PlaybackStats {
    clips_played: AtomicU64,
    frames_written: AtomicU64,
    busy_retries: AtomicU64,
    underruns: AtomicU64,
    suspends: AtomicU64,
    resume_polls: AtomicU64,
}

/// Point-in-time copy of [`PlaybackStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Complete clip repetitions handed to the device.
    pub clips_played: u64,
    pub frames_written: u64,
    pub busy_retries: u64,
    pub underruns: u64,
    pub suspends: u64,
    /// Resume attempts that came back "not yet".
    pub resume_polls: u64,
}

impl PlaybackStats {
    /// Create a shared counter block.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            clips_played: self.clips_played.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            busy_retries: self.busy_retries.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            suspends: self.suspends.load(Ordering::Relaxed),
            resume_polls: self.resume_polls.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_frames(&self, frames: usize) {
        self.frames_written.fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_clip(&self) {
        self.clips_played.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_busy(&self) {
        self.busy_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_underrun(&self) {
        self.underruns.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suspend(&self) {
        self.suspends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_resume_poll(&self) {
        self.resume_polls.fetch_add(1, Ordering::Relaxed);
    }
}
