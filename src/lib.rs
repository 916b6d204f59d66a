//! mpegrecover - Recover MPEG program-stream recordings from damaged captures
//!
//! This library crate exposes the command-line layer around
//! `mpegrecover-core` for integration testing.

pub mod config;
pub mod recover;
pub mod report;
