//! Unit test harness.

#[path = "../support/mod.rs"]
mod support;

mod decode_gpx_test;
mod detect_test;
