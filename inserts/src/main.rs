//! Times bulk insertion of key/value records into a persistent store.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use nibble_radix::{FlatTrie, KvStore, RadixTree};
use tracing_subscriber::EnvFilter;

mod input;

use input::Record;

#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Insert every record from the input into a fresh store and report timing
#[derive(Parser)]
#[command(name = "inserts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store implementation to fill
    #[arg(value_enum, default_value_t = Store::Radix)]
    store: Store,

    /// Read records from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print nothing on success
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Store {
    /// Path-compressed radix tree
    Radix,
    /// One node per nibble, no compression
    Flat,
}

struct Report {
    elapsed: Duration,
    len: usize,
    allocated: usize,
}

/// Bytes currently held by the allocator.
fn allocated() -> Result<usize> {
    tikv_jemalloc_ctl::epoch::advance().map_err(|e| anyhow!("jemalloc epoch: {e}"))?;
    tikv_jemalloc_ctl::stats::allocated::read().map_err(|e| anyhow!("jemalloc stats: {e}"))
}

fn fill<S: KvStore<Vec<u8>>>(empty: S, records: Vec<Record>) -> Result<(S, Duration)> {
    let started = Instant::now();
    let mut store = empty;
    for (i, record) in records.into_iter().enumerate() {
        store = store
            .insert(&record.key, record.value)
            .with_context(|| format!("record {}", i + 1))?;
    }
    Ok((store, started.elapsed()))
}

// Records are consumed by `fill`, so the allocation figure covers the store alone.
fn run<S: KvStore<Vec<u8>>>(empty: S, records: Vec<Record>) -> Result<Report> {
    let (store, elapsed) = fill(empty, records)?;
    let allocated = allocated()?;
    let len = store.len();
    drop(store);
    Ok(Report {
        elapsed,
        len,
        allocated,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let records = input::read_path(cli.input.as_deref())?;
    tracing::info!(records = records.len(), store = ?cli.store, "inserting");

    let report = match cli.store {
        Store::Radix => run(RadixTree::new(), records)?,
        Store::Flat => run(FlatTrie::new(), records)?,
    };
    tracing::info!(
        len = report.len,
        allocated = report.allocated,
        elapsed = ?report.elapsed,
        "filled"
    );

    if !cli.quiet {
        println!("{}", report.elapsed.as_secs_f64());
        println!("{}", report.len);
        println!("{}", report.allocated);
    }
    Ok(())
}
