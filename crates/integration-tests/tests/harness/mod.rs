//! Shared fixtures for router integration tests
//!
//! Each test binary compiles this module separately and uses a subset of it.

#![allow(dead_code)]

pub mod backends;
pub mod callbacks;
pub mod fixtures;
