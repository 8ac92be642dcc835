//! Demo walkthrough for the parcel lifecycle.
//!
//! # Responsibility
//! - Wire `parceltrack_core` together end to end against a real DB file.
//! - Keep output deterministic for quick local sanity checks.

use parceltrack_core::db::open_db;
use parceltrack_core::{
    default_log_level, init_logging, ClientId, ParcelService, SqliteParcelRepository,
};
use std::error::Error;
use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "tracker.db";
const DEMO_CLIENT: ClientId = 1000;

fn main() {
    if let Err(err) = run() {
        eprintln!("parceltrack: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

    init_file_logging();

    let conn = open_db(&db_path)?;
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn)?);

    let parcel = service.register(DEMO_CLIENT, "12 Packet Lane")?;
    println!(
        "registered parcel {} for client {}",
        parcel.number, parcel.client
    );

    service.change_address(parcel.number, "14 Packet Lane")?;
    println!(
        "address while registered: {}",
        service.parcel(parcel.number)?.address
    );

    service.next_status(parcel.number)?;
    println!(
        "parcel {} moved to {}",
        parcel.number,
        service.parcel(parcel.number)?.status
    );

    // Address and row are frozen once the parcel leaves `registered`;
    // both calls below report success without touching anything.
    service.change_address(parcel.number, "99 Nowhere Road")?;
    service.delete(parcel.number)?;
    let frozen = service.parcel(parcel.number)?;
    println!(
        "after sending, the address stays `{}` and the row survives deletion",
        frozen.address
    );

    let scrapped = service.register(DEMO_CLIENT, "7 Mistake Street")?;
    service.delete(scrapped.number)?;
    match service.parcel(scrapped.number) {
        Err(err) if err.is_not_found() => {
            println!("parcel {} deleted while registered", scrapped.number);
        }
        Ok(_) => println!("parcel {} unexpectedly survived deletion", scrapped.number),
        Err(err) => return Err(err.into()),
    }

    println!("parcels for client {DEMO_CLIENT}:");
    for parcel in service.client_parcels(DEMO_CLIENT)? {
        println!("{}", serde_json::to_string(&parcel)?);
    }

    Ok(())
}

/// File logging is best effort here; the walkthrough prints to stdout
/// either way.
fn init_file_logging() {
    let log_dir = match std::env::current_dir() {
        Ok(dir) => dir.join("logs"),
        Err(err) => {
            eprintln!("parceltrack: cannot resolve a log directory: {err}");
            return;
        }
    };
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("parceltrack: file logging disabled: {err}");
    }
}
