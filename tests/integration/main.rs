//! Integration test harness.

#[path = "../support/mod.rs"]
mod support;
