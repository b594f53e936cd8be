//! Headless driver for the battle controller
//!
//! Stands in for a presentation layer: paces the countdown, runs gem animations,
//! acknowledges matches once their clear animation would have finished, and sums
//! the mission up in a [`MissionReport`].

pub mod host;
pub mod report;

pub use host::{HeadlessHost, HostOptions};
pub use report::{MissionReport, Outcome};
