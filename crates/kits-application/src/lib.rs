//! Application layer for Kits.
//!
//! This crate runs page sessions on top of the domain types in `kits-core`:
//! one actor task per open page, a registry of open sessions, and the
//! `KitsService` that ties them to the shared cooldown ledger.

pub mod kits_service;
pub mod session;

pub use kits_service::KitsService;
pub use session::{SessionHandle, SessionRegistry};
