//! piep: play an endless sine tone through ALSA.
//!
//! ## Pipeline
//! 1. **Negotiate**: open the PCM and settle on mono S16 with a one-second period.
//! 2. **Synthesize**: build one period of sine, with the frequency rounded so the period
//!    holds a whole number of cycles.
//! 3. **Play**: write that same clip to the device forever, riding out underruns and
//!    suspends.
//!
//! The process only exits on `-h` (status 0), bad arguments, or a fatal device error
//! (status 1).

use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(piep::runtime::run(std::env::args_os()))
}
