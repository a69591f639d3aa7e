//! Status message module.
//!
//! Builds the payload for the tracked channel message from the latest
//! known counts and the configured style overrides.

mod message;

pub use message::{effective_title, StatusMessage, DEFAULT_TITLE, UPDATING_PLACEHOLDER};
