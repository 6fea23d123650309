//! Workspace placeholder crate.
//!
//! This crate exists so host applications can depend on `psc-workspace` and
//! reach the sync engine without wiring each workspace crate individually.

pub use core_sync;
