//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract for parcel records.
//! - Isolate SQLite statement details from service orchestration.
//!
//! # Invariants
//! - Guarded mutations are single conditional statements; the guard is
//!   evaluated by the storage engine, never by a prior read.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage transport errors.

pub mod parcel_repo;
