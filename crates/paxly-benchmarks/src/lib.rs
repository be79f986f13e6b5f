//! Paxly benchmarking suite
//!
//! Benchmarks for dependency resolution over synthetic package graphs and for
//! manifest and version parsing.

pub mod common;

pub use common::*;
