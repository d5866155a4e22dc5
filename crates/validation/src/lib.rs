//! Display-width validation for ad text fields.
//!
//! The external ads platform counts characters by display width, not code
//! points: East Asian wide/fullwidth characters cost 2 units, everything
//! else costs 1. All functions here are pure; nothing mutates persisted
//! state.

pub mod rsa;
pub mod width;

pub use rsa::{validate_rsa_batch, RsaLimits};
pub use width::{display_width, enforce_limit, validate_field};
