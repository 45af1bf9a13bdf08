//! Command implementations for regen CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod batch;
pub mod input;
pub mod merge;
