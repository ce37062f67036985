//! End-to-end planner tests.

mod properties;
mod scenarios;
