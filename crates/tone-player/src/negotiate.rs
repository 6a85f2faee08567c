//! Hardware parameter negotiation.

use crate::backend::{HardwareProfile, HwParam, HwRequest, NegotiationError, PcmBackend};
use crate::config::PlaybackConfig;

/// Negotiate the fixed mono S16 setup at the configured rate.
///
/// The returned profile holds whatever the device settled on; callers must size
/// everything from it rather than from `config`.
pub fn negotiate<B: PcmBackend>(
    backend: &mut B,
    config: &PlaybackConfig,
) -> Result<HardwareProfile, NegotiationError> {
    let request = HwRequest::for_config(config);
    let profile = backend.negotiate(&request)?;

    if profile.rate_hz == 0 {
        return Err(NegotiationError::Unusable {
            param: HwParam::Rate,
            value: 0,
        });
    }
    if profile.period_frames == 0 {
        return Err(NegotiationError::Unusable {
            param: HwParam::PeriodSize,
            value: 0,
        });
    }

    if profile.rate_hz != request.rate_hz {
        tracing::info!(
            requested_hz = request.rate_hz,
            negotiated_hz = profile.rate_hz,
            "device picked nearest supported sample rate"
        );
    }
    tracing::info!(
        rate_hz = profile.rate_hz,
        buffer_time_us = profile.buffer_time_us,
        period_time_us = profile.period_time_us,
        period_frames = profile.period_frames,
        "device output config"
    );

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn profile(rate_hz: u32, period_frames: usize) -> HardwareProfile {
        HardwareProfile {
            rate_hz,
            period_time_us: 1_000_000,
            buffer_time_us: 3_000_000,
            period_frames,
        }
    }

    #[test]
    fn requests_fixed_policy_at_configured_rate() {
        let cfg = PlaybackConfig::new("default", 22_050, 440.0, false);
        let mut backend = MockBackend::new(profile(22_050, 22_050));

        let got = negotiate(&mut backend, &cfg).unwrap();

        assert_eq!(got, profile(22_050, 22_050));
        let req = backend.calls().negotiations[0];
        assert_eq!(req.channels, 1);
        assert_eq!(req.rate_hz, 22_050);
        assert_eq!(req.period_time_us, 1_000_000);
        assert_eq!(req.buffer_time_us, 3_000_000);
    }

    #[test]
    fn returns_negotiated_values_not_requested_ones() {
        let cfg = PlaybackConfig::new("default", 44_100, 440.0, false);
        let negotiated = HardwareProfile {
            rate_hz: 48_000,
            period_time_us: 682_666,
            buffer_time_us: 2_048_000,
            period_frames: 32_768,
        };
        let mut backend = MockBackend::new(negotiated);

        assert_eq!(negotiate(&mut backend, &cfg).unwrap(), negotiated);
    }

    #[test]
    fn rejection_names_the_parameter() {
        let cfg = PlaybackConfig::default();
        let mut backend = MockBackend::new(profile(44_100, 44_100)).rejecting(HwParam::Channels);

        let err = negotiate(&mut backend, &cfg).unwrap_err();

        assert_eq!(err.param(), HwParam::Channels);
        assert!(err.to_string().contains("channel count"), "{err}");
    }

    #[test]
    fn zero_period_is_unusable() {
        let cfg = PlaybackConfig::default();
        let mut backend = MockBackend::new(profile(44_100, 0));

        let err = negotiate(&mut backend, &cfg).unwrap_err();

        assert_eq!(
            err,
            NegotiationError::Unusable {
                param: HwParam::PeriodSize,
                value: 0
            }
        );
    }

    #[test]
    fn zero_rate_is_unusable() {
        let cfg = PlaybackConfig::default();
        let mut backend = MockBackend::new(profile(0, 1_024));

        let err = negotiate(&mut backend, &cfg).unwrap_err();

        assert_eq!(err.param(), HwParam::Rate);
    }
}
