//! bcdb CLI
//!
//! Command-line interface for appending to and reading from a bcdb store.

use std::path::PathBuf;
use std::process::ExitCode;

use bcdb::{BcdbError, Config, LogStore, Record, StoreOptions, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// bcdb CLI
#[derive(Parser, Debug)]
#[command(name = "bcdb-cli")]
#[command(about = "CLI for the bcdb append-only record store")]
#[command(version)]
struct Args {
    /// Root directory (must exist; the store lives in <dir>/bcdb)
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// fsync after every append
    #[arg(long)]
    sync: bool,

    /// Answer lookups from an in-memory offset cache
    #[arg(long)]
    offset_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a record
    Append {
        /// Record identifier
        id: u32,

        /// Payload (stored as UTF-8 bytes)
        payload: String,
    },

    /// Get a record by append position
    GetIndex {
        /// 0-based position
        position: u64,
    },

    /// Get the first record with an identifier
    GetId {
        /// Record identifier
        id: u32,
    },

    /// Check whether an identifier exists
    Has {
        /// Record identifier
        id: u32,
    },

    /// Print the number of records
    Count,

    /// Print every record in append order
    Dump,

    /// Check index/data consistency
    Verify,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bcdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> bcdb::Result<()> {
    let options = match args.command {
        Commands::Append { .. } => StoreOptions::default(),
        _ => StoreOptions::read_only(),
    };
    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsManaged
    };

    let config = Config::builder()
        .root_dir(&args.dir)
        .open_options(options)
        .sync_strategy(sync_strategy)
        .offset_cache(args.offset_cache)
        .build();

    let mut store = LogStore::open(config)?;

    match args.command {
        Commands::Append { id, payload } => {
            store.append(id, payload.as_bytes())?;
            println!("appended record {} ({} bytes)", id, payload.len());
        }
        Commands::GetIndex { position } => print_record(&store.get_by_index(position)?),
        Commands::GetId { id } => print_record(&store.get_by_id(id)?),
        Commands::Has { id } => println!("{}", store.has_index_by_id(id)?),
        Commands::Count => println!("{}", store.count()?),
        Commands::Dump => {
            for record in store.records()? {
                print_record(&record?);
            }
        }
        Commands::Verify => {
            let report = store.verify()?;
            println!(
                "entries={} torn_index_bytes={} expected_data_len={} actual_data_len={}",
                report.entries,
                report.torn_index_bytes,
                report.expected_data_len,
                report.actual_data_len
            );
            if !report.is_consistent() {
                return Err(BcdbError::CorruptStore(format!(
                    "{} data bytes missing, {} orphaned",
                    report.missing_data_bytes(),
                    report.orphaned_data_bytes()
                )));
            }
        }
    }

    store.close()
}

fn print_record(record: &Record) {
    println!(
        "{}\t{}",
        record.identifier,
        String::from_utf8_lossy(&record.payload)
    );
}
