//! Service plumbing shared by campus binaries: tracing setup, health and readiness,
//! request-id middleware and the session identity extractor.

pub mod health;
pub mod identity;
pub mod middleware;
pub mod tracing;
