pub mod access;
pub mod catalog;
pub mod credential;
pub mod enrollment;
pub mod payment;
pub mod purchase;
pub mod reconcile;
pub mod session;
pub mod sync;
