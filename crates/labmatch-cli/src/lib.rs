//! Library side of the `labmatch` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod progress;
