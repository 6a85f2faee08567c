pub use tone_player::config::PlaybackConfig;

use tone_player::config::DEFAULT_DEVICE;

use crate::cli::Args;

/// Build the immutable playback config from parsed arguments.
pub fn playback_config(args: &Args) -> PlaybackConfig {
    PlaybackConfig::new(
        normalize_device_name(&args.device),
        args.rate_hz,
        args.frequency_hz,
        args.verbose,
    )
}

fn normalize_device_name(device: &str) -> String {
    let trimmed = device.trim();
    if trimmed.is_empty() {
        DEFAULT_DEVICE.to_string()
    } else {
        trimmed.to_string()
    }
}
