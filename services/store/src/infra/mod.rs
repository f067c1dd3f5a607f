pub mod codec;
pub mod filter;
pub mod local;
pub mod remote;
pub mod repository;
pub mod store;
