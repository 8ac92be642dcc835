//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical parcel record and its insert payload.
//! - Publish the lifecycle status values known to the tracker.
//!
//! # Invariants
//! - `number` is storage-assigned and never reused for another parcel.
//! - Only `STATUS_REGISTERED` carries guard semantics; the status space is
//!   otherwise open-ended text.

pub mod parcel;
