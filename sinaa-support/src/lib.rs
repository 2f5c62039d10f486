//! # Sinaa Support
//!
//! Shared utilities for the Sinaa DI framework.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Tracing subscriber setup for binaries and tests

pub mod logging;
pub mod rendering;
