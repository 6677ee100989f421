//! Integration test crate for Medley.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the medley crates to verify they work together.

#[cfg(test)]
mod pool;

#[cfg(test)]
mod pipeline;
