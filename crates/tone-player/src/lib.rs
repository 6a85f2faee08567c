pub mod backend;
pub mod clip;
pub mod config;
pub mod device;
pub mod negotiate;
pub mod pipeline;
pub mod playback;
pub mod status;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
