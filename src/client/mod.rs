//! HTTP probe client
//!
//! The `HttpProbe` trait is the only way the runner talks to the network.
//! `ProbeClient` is the reqwest-backed implementation used by the binary.

mod probe;
#[cfg(test)]
pub(crate) mod scripted;
mod types;

pub use probe::{HttpProbe, ProbeClient, ProbeError, ProbeResult};
pub use types::*;
