//! Integration tests for the pizza service shell.
//!
//! These tests drive the full router and check what reaches the telemetry
//! aggregator.

mod common;
mod health_tests;
mod tracking_tests;
