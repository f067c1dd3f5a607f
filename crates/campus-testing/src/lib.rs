//! Test utilities for campus services.
//!
//! Provides record fixtures and session header helpers.
//! Import in tests only, never in production code.

pub mod auth;
pub mod fixture;
