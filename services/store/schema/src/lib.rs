//! sea-orm entities for the store's local fallback database.

pub mod fallback_entities;
