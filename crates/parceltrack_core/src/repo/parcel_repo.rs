//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD surface over the canonical `parcel` relation.
//! - Enforce the registered-status guard for address changes and deletion.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Guarded writes evaluate the status predicate and the mutation in one
//!   statement; no read-check-write sequence exists on these paths.
//! - A failed guard is a soft denial: the call succeeds, changes nothing,
//!   and leaves a `status=denied` log record.
//! - `get` keeps the underlying no-rows signal reachable through
//!   `Error::source()`.

use crate::db::migrations;
use crate::model::parcel::{ClientId, NewParcel, Parcel, ParcelNumber, STATUS_REGISTERED};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// `get` matched no row for the requested number.
    ///
    /// Carries the underlying no-rows signal so callers can reach it
    /// through `Error::source()` instead of a flattened message.
    NotFound {
        number: ParcelNumber,
        source: rusqlite::Error,
    },
    /// Any other storage failure, tagged with the failing operation.
    Storage {
        context: String,
        source: rusqlite::Error,
    },
    /// The connection's schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// The connection lacks a table the repository requires.
    MissingRequiredTable(&'static str),
    /// The connection lacks a column the repository requires.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    fn storage(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Returns whether this error is the missing-row case of `get`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { number, .. } => write!(f, "parcel {number} not found"),
            Self::Storage { context, source } => write!(f, "{context}: {source}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open the database through db::open_db first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { source, .. } | Self::Storage { source, .. } => Some(source),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

/// Repository interface for parcel CRUD and guarded mutations.
pub trait ParcelRepository {
    /// Inserts a new parcel row and returns its storage-assigned number.
    ///
    /// The initial `registered` status is caller convention; any status
    /// text in the payload is persisted as given.
    fn add(&self, parcel: &NewParcel) -> RepoResult<ParcelNumber>;

    /// Fetches exactly one parcel by number.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;

    /// Fetches every parcel owned by `client`.
    ///
    /// Rows come back in storage iteration order; callers must not assume
    /// any ordering. An unknown client yields an empty vec, not an error.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;

    /// Overwrites the status unconditionally.
    ///
    /// Accepts any status text and is a silent no-op for unknown numbers;
    /// there is no transition table at this layer.
    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()>;

    /// Updates the address while the parcel is still `registered`.
    ///
    /// # Contract
    /// - The predicate and the write are one atomic statement; a status
    ///   flip racing this call can never land between check and update.
    /// - A failed guard (wrong status or missing row) is a soft denial:
    ///   `Ok(())`, no change, one warn-level log record.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;

    /// Physically deletes the row while the parcel is still `registered`.
    ///
    /// Same atomicity and soft-denial contract as `set_address`; no
    /// tombstone remains.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository over a borrowed connection.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not
    ///   match the latest migration known to this binary.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the `parcel`
    ///   relation does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &NewParcel) -> RepoResult<ParcelNumber> {
        self.insert_row(parcel).map_err(|err| {
            RepoError::storage(format!("add parcel for client {}", parcel.client), err)
        })
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        match self.select_row(number) {
            Ok(parcel) => Ok(parcel),
            Err(source @ rusqlite::Error::QueryReturnedNoRows) => {
                Err(RepoError::NotFound { number, source })
            }
            Err(err) => Err(RepoError::storage(format!("get parcel {number}"), err)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.select_client_rows(client)
            .map_err(|err| RepoError::storage(format!("list parcels for client {client}"), err))
    }

    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE parcel SET status = ?2 WHERE number = ?1;",
                params![number, status],
            )
            .map_err(|err| {
                RepoError::storage(format!("set status `{status}` on parcel {number}"), err)
            })?;

        if changed == 0 {
            debug!("event=set_status module=repo status=noop number={number}");
        }
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE parcel
                 SET address = ?2
                 WHERE number = ?1
                   AND status = ?3;",
                params![number, address, STATUS_REGISTERED],
            )
            .map_err(|err| RepoError::storage(format!("set address on parcel {number}"), err))?;

        if changed == 0 {
            // Soft denial: wrong status or no such parcel. The caller
            // still sees success.
            warn!(
                "event=set_address module=repo status=denied number={number} required_status={STATUS_REGISTERED}"
            );
        }
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM parcel
                 WHERE number = ?1
                   AND status = ?2;",
                params![number, STATUS_REGISTERED],
            )
            .map_err(|err| RepoError::storage(format!("delete parcel {number}"), err))?;

        if changed == 0 {
            warn!(
                "event=delete module=repo status=denied number={number} required_status={STATUS_REGISTERED}"
            );
        }
        Ok(())
    }
}

impl SqliteParcelRepository<'_> {
    fn insert_row(&self, parcel: &NewParcel) -> rusqlite::Result<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status,
                parcel.address,
                parcel.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn select_row(&self, number: ParcelNumber) -> rusqlite::Result<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;
        stmt.query_row(params![number], parse_parcel_row)
    }

    fn select_client_rows(&self, client: ClientId) -> rusqlite::Result<Vec<Parcel>> {
        // No ORDER BY: consumers must not assume any ordering.
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;
        let rows = stmt.query_map(params![client], parse_parcel_row)?;
        rows.collect()
    }
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    const CONTEXT: &str = "inspect parcel schema";

    let actual_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| RepoError::storage(CONTEXT, err))?;
    let expected_version = migrations::latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, PARCEL_TABLE).map_err(|err| RepoError::storage(CONTEXT, err))? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for column in PARCEL_COLUMNS {
        if !table_has_column(conn, PARCEL_TABLE, column)
            .map_err(|err| RepoError::storage(CONTEXT, err))?
        {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
