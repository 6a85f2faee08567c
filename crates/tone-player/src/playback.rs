//! Playback stage (blocking clip loop).
//!
//! Hands the same precomputed clip to the device over and over. The blocking write
//! is the only pacing; there are no timers on the hot path. The loop:
//! - retries immediately when the device is busy
//! - re-prepares the stream after an underrun
//! - polls `resume` once per interval while the stream is suspended
//!
//! Anything else is fatal and returned to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::backend::{DeviceError, PcmBackend, ResumeError, WriteError};
use crate::clip::Clip;
use crate::config::RESUME_POLL_INTERVAL;
use crate::status::PlaybackStats;

/// Configuration for the playback loop.
#[derive(Clone, Debug)]
pub struct PlaybackOptions {
    /// When set and `true`, the loop returns `Ok(())` before the next write.
    pub cancel: Option<Arc<AtomicBool>>,
    /// When set, the loop records writes and recoveries here.
    pub stats: Option<Arc<PlaybackStats>>,
    /// Wait between resume attempts while suspended.
    pub resume_poll_interval: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            cancel: None,
            stats: None,
            resume_poll_interval: RESUME_POLL_INTERVAL,
        }
    }
}

/// Loop `clip` on `backend` until cancelled or a fatal device error occurs.
///
/// Without a cancel flag this only ever returns an error.
pub fn play_clip<B: PcmBackend>(
    backend: &mut B,
    clip: &Clip,
    opts: &PlaybackOptions,
) -> Result<(), DeviceError> {
    play_clip_with_sleep(backend, clip, opts, thread::sleep)
}

/// [`play_clip`] with a caller-supplied sleep for the suspend poll.
pub fn play_clip_with_sleep<B, S>(
    backend: &mut B,
    clip: &Clip,
    opts: &PlaybackOptions,
    mut sleep: S,
) -> Result<(), DeviceError>
where
    B: PcmBackend,
    S: FnMut(Duration),
{
    let frames = clip.samples();
    debug_assert!(!frames.is_empty(), "clip must hold at least one frame");
    let stats = opts.stats.clone().unwrap_or_default();

    // Position inside the clip; only a short write leaves it non-zero.
    let mut offset = 0usize;

    loop {
        if is_cancelled(opts) {
            return Ok(());
        }

        match backend.write(&frames[offset..]) {
            Ok(0) | Err(WriteError::Busy) => {
                stats.record_busy();
                thread::yield_now();
            }
            Ok(written) => {
                let written = written.min(frames.len() - offset);
                stats.record_frames(written);
                offset += written;
                if offset == frames.len() {
                    offset = 0;
                    stats.record_clip();
                }
            }
            Err(WriteError::Underrun) => {
                stats.record_underrun();
                tracing::debug!("underrun; re-preparing stream");
                backend.prepare()?;
            }
            Err(WriteError::Suspended) => {
                stats.record_suspend();
                tracing::debug!("stream suspended; waiting for resume");
                wait_for_resume(backend, opts.resume_poll_interval, &stats, &mut sleep)?;
                backend.prepare()?;
            }
            Err(WriteError::Fatal(err)) => return Err(err),
        }
    }
}

fn wait_for_resume<B, S>(
    backend: &mut B,
    interval: Duration,
    stats: &PlaybackStats,
    sleep: &mut S,
) -> Result<(), DeviceError>
where
    B: PcmBackend,
    S: FnMut(Duration),
{
    loop {
        match backend.resume() {
            Ok(()) => return Ok(()),
            Err(ResumeError::NotYet) => {
                stats.record_resume_poll();
                sleep(interval);
            }
            Err(ResumeError::Fatal(err)) => return Err(err),
        }
    }
}

fn is_cancelled(opts: &PlaybackOptions) -> bool {
    opts.cancel
        .as_ref()
        .map(|c| c.load(Ordering::Relaxed))
        .unwrap_or(false)
}
