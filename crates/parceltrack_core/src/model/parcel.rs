//! Parcel domain model.
//!
//! # Responsibility
//! - Define the parcel record persisted as one row per parcel.
//! - Provide the insert payload used before a storage number exists.
//!
//! # Invariants
//! - `number` and `client` are immutable after creation.
//! - `created_at` is opaque text to the store; the service layer writes
//!   RFC 3339 UTC strings into it.
//! - The status space is open-ended; only `STATUS_REGISTERED` gates
//!   address changes and deletion.

use serde::{Deserialize, Serialize};

/// Storage-assigned primary key of a parcel row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ParcelNumber = i64;

/// Identifier of the client who owns a parcel.
pub type ClientId = i64;

/// Initial lifecycle state and the only value with guard semantics.
pub const STATUS_REGISTERED: &str = "registered";
/// Parcel handed over for transport.
pub const STATUS_SENT: &str = "sent";
/// Parcel arrived at the recipient.
pub const STATUS_DELIVERED: &str = "delivered";

/// One tracked shipment record.
///
/// The store compares `status` only against `STATUS_REGISTERED`; every
/// other value is opaque text to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Storage-assigned key, immutable once created.
    pub number: ParcelNumber,
    /// Owning client, immutable once created.
    pub client: ClientId,
    /// Lifecycle state text, mutable at any time via `set_status`.
    pub status: String,
    /// Delivery address, mutable only while `status == STATUS_REGISTERED`.
    pub address: String,
    /// Creation timestamp text, not reinterpreted by the store.
    pub created_at: String,
}

impl Parcel {
    /// Returns whether the guarded mutations (address change, deletion)
    /// are currently permitted for this record.
    pub fn is_registered(&self) -> bool {
        self.status == STATUS_REGISTERED
    }
}

/// Insert payload for a parcel that has no storage-assigned number yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParcel {
    pub client: ClientId,
    pub status: String,
    pub address: String,
    pub created_at: String,
}

impl NewParcel {
    /// Creates the payload for a freshly registered parcel.
    ///
    /// The `registered` initial status is caller convention; the store
    /// itself accepts any status text at insert.
    pub fn registered(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            client,
            status: STATUS_REGISTERED.to_string(),
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Attaches the storage-assigned number, yielding the full record.
    pub fn into_parcel(self, number: ParcelNumber) -> Parcel {
        Parcel {
            number,
            client: self.client,
            status: self.status,
            address: self.address,
            created_at: self.created_at,
        }
    }
}
