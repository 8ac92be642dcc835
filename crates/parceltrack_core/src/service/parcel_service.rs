//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide lifecycle entry points over the repository contract.
//! - Own caller-side conventions the store does not enforce: initial
//!   `registered` status and RFC 3339 UTC creation timestamps.
//!
//! # Invariants
//! - Service APIs never bypass repository guard semantics.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{
    ClientId, NewParcel, Parcel, ParcelNumber, STATUS_DELIVERED, STATUS_REGISTERED, STATUS_SENT,
};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};
use chrono::{SecondsFormat, Utc};
use log::{debug, info};

/// Use-case service wrapper for the parcel lifecycle.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` shipping to `address`.
    ///
    /// # Contract
    /// - Status starts as `registered`.
    /// - `created_at` is the current UTC time in RFC 3339.
    /// - Returns the stored record carrying its assigned number.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let draft = NewParcel::registered(client, address, now_rfc3339());
        let number = self.repo.add(&draft)?;
        info!("event=register module=service status=ok number={number} client={client}");
        Ok(draft.into_parcel(number))
    }

    /// Advances the parcel one step along `registered` -> `sent` -> `delivered`.
    ///
    /// A parcel that is already delivered, or carries a status outside the
    /// known sequence, is left untouched.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<()> {
        let parcel = self.repo.get(number)?;
        let next = match parcel.status.as_str() {
            STATUS_REGISTERED => STATUS_SENT,
            STATUS_SENT => STATUS_DELIVERED,
            current => {
                debug!("event=next_status module=service status=noop number={number} current={current}");
                return Ok(());
            }
        };
        self.repo.set_status(number, next)?;
        info!("event=next_status module=service status=ok number={number} next={next}");
        Ok(())
    }

    /// Changes the delivery address.
    ///
    /// Inherits the repository guard: a parcel that already left
    /// `registered` keeps its current address and the call still succeeds.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address)
    }

    /// Removes the parcel from the store.
    ///
    /// Inherits the repository guard: only `registered` parcels are removed.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number)
    }

    /// Gets one parcel by tracking number.
    pub fn parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists every parcel registered by `client`, in no particular order.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
