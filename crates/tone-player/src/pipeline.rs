//! Tone pipeline wiring: negotiate, synthesize once, then loop the clip.

use std::io;

use anyhow::{Context, Result};

use crate::backend::{HardwareProfile, PcmBackend};
use crate::clip::Clip;
use crate::config::PlaybackConfig;
use crate::negotiate::negotiate;
use crate::playback::{self, PlaybackOptions};

/// Device setup plus the clip built for it.
#[derive(Debug, Clone)]
pub struct ToneSession {
    pub profile: HardwareProfile,
    pub clip: Clip,
}

/// Negotiate the device and synthesize the clip for the negotiated period.
///
/// With `config.verbose()`, the backend's setup dump is written to `diag`.
pub fn prepare_tone<B: PcmBackend>(
    backend: &mut B,
    config: &PlaybackConfig,
    diag: &mut dyn io::Write,
) -> Result<ToneSession> {
    let profile = negotiate(backend, config)
        .with_context(|| format!("negotiate hardware parameters for {}", config.device()))?;

    if config.verbose() {
        if let Err(e) = backend.dump(diag) {
            tracing::warn!("pcm dump failed: {e}");
        }
    }

    let clip = Clip::synthesize(&profile, config.frequency_hz());
    tracing::info!(
        requested_hz = clip.requested_hz(),
        effective_hz = clip.effective_hz(),
        cycles = clip.cycles(),
        frames = clip.frames(),
        "using rounded frequency"
    );

    Ok(ToneSession { profile, clip })
}

/// Prepare the tone and play it until cancelled or the device fails.
///
/// The verbose setup dump goes to stderr.
pub fn play_tone<B: PcmBackend>(
    backend: &mut B,
    config: &PlaybackConfig,
    opts: &PlaybackOptions,
) -> Result<()> {
    let session = prepare_tone(backend, config, &mut io::stderr().lock())?;
    playback::play_clip(backend, &session.clip, opts).context("playback")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::backend::HwParam;
    use crate::mock::{MockBackend, MockWrite};

    #[test]
    fn clip_is_sized_from_negotiated_rate() {
        let cfg = PlaybackConfig::new("default", 44_100, 440.0, false);
        let negotiated = HardwareProfile {
            rate_hz: 48_000,
            period_time_us: 500_000,
            buffer_time_us: 1_500_000,
            period_frames: 24_000,
        };
        let mut backend = MockBackend::new(negotiated);

        let mut diag = Vec::new();
        let session = prepare_tone(&mut backend, &cfg, &mut diag).unwrap();

        assert!(diag.is_empty());
        assert_eq!(backend.calls().negotiations[0].rate_hz, 44_100);
        assert_eq!(session.profile, negotiated);
        assert_eq!(session.clip.rate_hz(), 48_000);
        assert_eq!(session.clip.frames(), 24_000);
        // 0.5 s clip: 440 Hz is exactly 220 cycles at the negotiated rate.
        assert_eq!(session.clip.cycles(), 220.0);
        assert_eq!(session.clip.effective_hz(), 440.0);
    }

    #[test]
    fn verbose_prepare_dumps_negotiated_setup() {
        let cfg = PlaybackConfig::new("default", 8_000, 1_000.0, true);
        let profile = HardwareProfile {
            rate_hz: 8_000,
            period_time_us: 1_000_000,
            buffer_time_us: 3_000_000,
            period_frames: 8_000,
        };
        let mut backend = MockBackend::new(profile);

        let mut diag = Vec::new();
        let session = prepare_tone(&mut backend, &cfg, &mut diag).unwrap();

        assert_eq!(session.clip.frames(), 8_000);
        assert_eq!(
            String::from_utf8(diag).unwrap(),
            "mock pcm: rate 8000 Hz, period 8000 frames\n"
        );
    }

    #[test]
    fn negotiation_failure_mentions_device_and_parameter() {
        let cfg = PlaybackConfig::new("hw:9,9", 44_100, 440.0, false);
        let profile = HardwareProfile {
            rate_hz: 44_100,
            period_time_us: 1_000_000,
            buffer_time_us: 3_000_000,
            period_frames: 44_100,
        };
        let mut backend = MockBackend::new(profile).rejecting(HwParam::Format);

        let mut diag = Vec::new();
        let err = prepare_tone(&mut backend, &cfg, &mut diag).unwrap_err();
        let text = format!("{err:#}");

        assert!(text.contains("hw:9,9"), "{text}");
        assert!(text.contains("device rejected sample format"), "{text}");
        assert!(backend.calls().writes.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn play_tone_reports_failing_operation() {
        let cfg = PlaybackConfig::new("default", 8_000, 440.0, false);
        let profile = HardwareProfile {
            rate_hz: 8_000,
            period_time_us: 1_000,
            buffer_time_us: 3_000,
            period_frames: 8,
        };
        let mut backend = MockBackend::new(profile)
            .with_writes([MockWrite::Accept, MockWrite::Fatal(libc::EIO)]);

        let err = play_tone(&mut backend, &cfg, &PlaybackOptions::default()).unwrap_err();
        let text = format!("{err:#}");

        assert!(text.starts_with("playback: snd_pcm_writei: "), "{text}");
    }

    #[test]
    fn play_tone_returns_when_cancelled() {
        let cfg = PlaybackConfig::new("default", 8_000, 440.0, false);
        let profile = HardwareProfile {
            rate_hz: 8_000,
            period_time_us: 1_000,
            buffer_time_us: 3_000,
            period_frames: 8,
        };
        let cancel = Arc::new(AtomicBool::new(false));
        let mut backend = MockBackend::new(profile)
            .with_writes([MockWrite::Underrun])
            .cancel_when_drained(cancel.clone());
        let opts = PlaybackOptions {
            cancel: Some(cancel),
            ..PlaybackOptions::default()
        };

        play_tone(&mut backend, &cfg, &opts).unwrap();

        assert_eq!(backend.calls().prepares, 1);
        assert_eq!(backend.calls().writes, vec![8, 8]);
    }
}
