//! STAGGER: staggered equity hedge planner for short call spreads.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod spread;
pub mod planner;
pub mod hedge;
pub mod report;
pub mod dashboard;
