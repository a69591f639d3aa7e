//! Poll loop module.
//!
//! Drives the fetch, compare, and message-update cycle on a fixed
//! interval and owns the state that survives between cycles.

mod runner;
mod state;

pub use runner::{Poller, PollerMessage};
pub use state::{PollPhase, PollState};
