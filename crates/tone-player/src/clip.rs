//! Loopable sine clip synthesis.
//!
//! A clip is exactly one hardware period of mono S16 samples. The requested
//! frequency is rounded so that a whole number of cycles fits in the clip, which
//! makes back-to-back repetitions phase continuous. All trigonometry happens here,
//! once, before playback starts.

use std::f64::consts::TAU;

use crate::backend::HardwareProfile;

/// Peak amplitude. Symmetric, so `i16::MIN` is never produced.
pub const FULL_SCALE: f64 = 32_767.0;

/// Whole cycles per clip and the frequency that yields exactly that many.
///
/// Cycles are rounded half away from zero (`f64::round`).
pub fn quantize_frequency(frequency_hz: f64, clip_secs: f64) -> (f64, f64) {
    let cycles = (frequency_hz * clip_secs).round();
    (cycles, cycles / clip_secs)
}

/// One period of a sine tone, looped verbatim for the whole playback.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    samples: Box<[i16]>,
    rate_hz: u32,
    requested_hz: f64,
    effective_hz: f64,
    cycles: f64,
}

impl Clip {
    /// Synthesize a clip sized to `profile.period_frames` at the negotiated rate.
    ///
    /// Frequencies above Nyquist are not rejected; the clip simply aliases.
    pub fn synthesize(profile: &HardwareProfile, frequency_hz: f64) -> Self {
        let clip_secs = profile.period_secs();
        let (cycles, effective_hz) = quantize_frequency(frequency_hz, clip_secs);
        let samples = (0..profile.period_frames)
            .map(|i| sample_at(effective_hz, profile.rate_hz, i))
            .collect();

        Self {
            samples,
            rate_hz: profile.rate_hz,
            requested_hz: frequency_hz,
            effective_hz,
            cycles,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    pub fn requested_hz(&self) -> f64 {
        self.requested_hz
    }

    /// The frequency actually emitted.
    pub fn effective_hz(&self) -> f64 {
        self.effective_hz
    }

    /// Whole sine cycles contained in the clip.
    pub fn cycles(&self) -> f64 {
        self.cycles
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.rate_hz)
    }
}

fn sample_at(frequency_hz: f64, rate_hz: u32, index: usize) -> i16 {
    let phase = TAU * frequency_hz * index as f64 / f64::from(rate_hz);
    (phase.sin() * FULL_SCALE).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(rate_hz: u32, period_frames: usize) -> HardwareProfile {
        HardwareProfile {
            rate_hz,
            period_time_us: 1_000_000,
            buffer_time_us: 3_000_000,
            period_frames,
        }
    }

    #[test]
    fn clip_length_is_one_period() {
        let clip = Clip::synthesize(&profile(44_100, 44_100), 440.0);
        assert_eq!(clip.frames(), 44_100);
        assert_eq!(clip.rate_hz(), 44_100);
        assert_eq!(clip.duration_secs(), 1.0);
    }

    #[test]
    fn whole_second_period_keeps_integer_frequency() {
        let clip = Clip::synthesize(&profile(48_000, 48_000), 440.0);
        assert_eq!(clip.cycles(), 440.0);
        assert_eq!(clip.effective_hz(), 440.0);
        assert_eq!(clip.requested_hz(), 440.0);
    }

    #[test]
    fn effective_frequency_stays_within_half_a_cycle() {
        let profiles = [
            profile(44_100, 44_100),
            profile(48_000, 16_384),
            profile(44_100, 940),
            profile(8_000, 333),
        ];
        let frequencies = [0.0, 1.0, 27.5, 100.3, 440.0, 997.0, 1_234.567, 3_999.9];
        for p in &profiles {
            let bound = 0.5 / p.period_secs();
            for &f in &frequencies {
                let clip = Clip::synthesize(p, f);
                let deviation = (clip.effective_hz() - f).abs();
                assert!(
                    deviation <= bound + 1e-9,
                    "f={f} rate={} frames={} deviation={deviation} bound={bound}",
                    p.rate_hz,
                    p.period_frames
                );
            }
        }
    }

    #[test]
    fn clip_tiles_without_phase_jump() {
        let p = profile(44_100, 940);
        let clip = Clip::synthesize(&p, 523.25);
        assert_eq!(clip.cycles().fract(), 0.0);
        assert!((clip.effective_hz() * clip.duration_secs() - clip.cycles()).abs() < 1e-9);

        let wrapped = sample_at(clip.effective_hz(), p.rate_hz, p.period_frames);
        let first = clip.samples()[0];
        assert!((i32::from(wrapped) - i32::from(first)).abs() <= 1, "{wrapped} vs {first}");
    }

    #[test]
    fn zero_hz_is_silence() {
        let clip = Clip::synthesize(&profile(44_100, 4_410), 0.0);
        assert_eq!(clip.cycles(), 0.0);
        assert_eq!(clip.effective_hz(), 0.0);
        assert!(clip.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn low_frequency_rounds_down_to_silence() {
        // 0.4 cycles in a 1 s clip rounds to zero.
        let clip = Clip::synthesize(&profile(48_000, 48_000), 0.4);
        assert_eq!(clip.cycles(), 0.0);
        assert!(clip.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn half_cycle_rounds_away_from_zero() {
        let (cycles, effective) = quantize_frequency(2.5, 1.0);
        assert_eq!(cycles, 3.0);
        assert_eq!(effective, 3.0);
    }

    #[test]
    fn samples_never_reach_negative_extreme() {
        for &f in &[0.0, 250.0, 440.0, 11_025.0, 22_050.0, 40_000.0] {
            let clip = Clip::synthesize(&profile(44_100, 4_410), f);
            assert!(
                clip.samples().iter().all(|&s| (-32_767..=32_767).contains(&s)),
                "f={f}"
            );
        }
    }

    #[test]
    fn quarter_rate_tone_hits_full_scale() {
        let clip = Clip::synthesize(&profile(8_000, 8_000), 2_000.0);
        assert_eq!(&clip.samples()[..4], &[0, 32_767, 0, -32_767]);
    }

    #[test]
    fn above_nyquist_is_not_rejected() {
        let p = profile(8_000, 8_000);
        let clip = Clip::synthesize(&p, 6_000.0);
        assert_eq!(clip.frames(), 8_000);
        assert_eq!(clip.cycles(), 6_000.0);
    }
}
