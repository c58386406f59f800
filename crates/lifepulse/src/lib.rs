//! Analytics core for the LifePulse wellness and finance tracker.
//!
//! Every computation is a pure function of a record snapshot, a small
//! configuration and an explicit `now`; nothing here reads the wall clock.

pub mod analytics;
pub mod config;
pub mod error;
pub mod records;
pub mod telemetry;
