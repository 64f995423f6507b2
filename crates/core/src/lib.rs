//! Core business logic for pawpost.
//!
//! Services own every authorization and state-transition rule; the HTTP
//! layer only maps requests onto them.

pub mod services;

pub use services::*;
