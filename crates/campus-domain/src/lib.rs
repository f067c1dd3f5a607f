//! Domain types shared by the campus store and its tools.
//!
//! This crate contains only pure record types, state machines and the access
//! decision. Every record carries its own `partitionKey`/`rowKey` pair so the
//! store's entity codec can address it without extra metadata.

pub mod access;
pub mod course;
pub mod enrollment;
pub mod id;
pub mod intent;
pub mod payment;
pub mod reset;
pub mod serde;
pub mod session;
pub mod user;
