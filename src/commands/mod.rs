//! # CLI Command Implementations
//!
//! The tool does one thing, so there is a single command module. It holds
//! the `clap` argument struct and the `execute` function that wires the
//! library components together.

pub mod copy;
