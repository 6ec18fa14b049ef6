//! Command-line modules
//!
//! - toolkit: selector, encode, decode and format commands

pub mod toolkit;
