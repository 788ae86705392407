//! Shared test helpers for `clinisync-core` integration tests.
//!
//! In-memory port implementations with call capture and failure injection,
//! plus record/event builders, so tests can focus on engine behaviour.

#![allow(dead_code)]

pub mod fixtures;
pub mod ports;
