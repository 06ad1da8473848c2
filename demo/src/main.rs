//! scorechain — Reputation Ledger Demo CLI
//!
//! Drives the full pipeline against a file-backed ledger: ingest a
//! scripted attack burst, page through the chain, print analytics,
//! verify integrity, and export records.
//!
//! Usage:
//!   cargo run -p demo -- simulate
//!   cargo run -p demo -- list --identity 203.0.113.7
//!   cargo run -p demo -- stats
//!   cargo run -p demo -- verify --full
//!   cargo run -p demo -- export --identity 203.0.113.7

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    record::RangeQuery,
};
use scorechain_core::IngestService;
use scorechain_ledger::FileLedger;
use scorechain_policy::TomlScorePolicy;
use scorechain_query::QueryService;
use scorechain_verify::{checkpoint, ChainVerifier, SchemaIngressValidator};

// ── CLI definition ────────────────────────────────────────────────────────────

/// scorechain — append-only, hash-chained reputation ledger demo.
///
/// Every subcommand operates on a JSON Lines ledger file, so state
/// persists between invocations: simulate first, then explore.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "scorechain reputation ledger demo",
    long_about = "Drives the scorechain pipeline: JSON Schema ingress validation,\n\
                  TOML scoring policy, SHA-256 hash-chained append-only storage,\n\
                  checkpointed integrity verification, and analytics."
)]
struct Cli {
    /// Path of the JSON Lines ledger file.
    #[arg(long, default_value = "scorechain.jsonl", global = true)]
    ledger: PathBuf,

    /// Optional TOML scoring policy; the stock penalty table otherwise.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a scripted burst of classification events.
    Simulate,
    /// Page through the chain, newest-first.
    List {
        #[arg(long, default_value_t = 0)]
        skip: u64,
        #[arg(long, default_value_t = 20)]
        limit: u64,
        /// Restrict to one identity (exact match).
        #[arg(long)]
        identity: Option<String>,
    },
    /// Aggregate analytics: band distribution, attack types, top threats.
    Stats {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Verify chain integrity from the persisted checkpoint.
    Verify {
        /// Rescan the whole chain instead of resuming.
        #[arg(long)]
        full: bool,
    },
    /// Export records as JSON Lines to stdout.
    Export {
        /// Restrict to one identity (exact match).
        #[arg(long)]
        identity: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Simulate => run_simulate(&cli),
        Command::List { skip, limit, identity } => run_list(&cli, *skip, *limit, identity.clone()),
        Command::Stats { top } => run_stats(&cli, *top),
        Command::Verify { full } => run_verify(&cli, *full),
        Command::Export { identity } => run_export(&cli, identity.clone()),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Component wiring ──────────────────────────────────────────────────────────

fn open_store(cli: &Cli) -> LedgerResult<Arc<FileLedger>> {
    Ok(Arc::new(FileLedger::open(&cli.ledger)?))
}

fn load_policy(cli: &Cli) -> LedgerResult<TomlScorePolicy> {
    match &cli.policy {
        Some(path) => TomlScorePolicy::from_file(path),
        None => Ok(TomlScorePolicy::default()),
    }
}

fn checkpoint_path(cli: &Cli) -> PathBuf {
    let mut path = cli.ledger.clone();
    path.set_extension("checkpoint.json");
    path
}

fn open_verifier(cli: &Cli) -> LedgerResult<Arc<ChainVerifier>> {
    let verifier = match checkpoint::load(&checkpoint_path(cli))? {
        Some(cp) => ChainVerifier::with_checkpoint(cp),
        None => ChainVerifier::new(),
    };
    Ok(Arc::new(verifier))
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// The scripted burst: repeat offenders, a slow scanner, and benign
/// traffic that slowly rebuilds trust.
fn run_simulate(cli: &Cli) -> LedgerResult<()> {
    let store = open_store(cli)?;
    let service = IngestService::new(
        store.clone(),
        Arc::new(load_policy(cli)?),
        Arc::new(SchemaIngressValidator::new()?),
    );

    let script = [
        ("203.0.113.7", "SQLI", true),
        ("203.0.113.7", "SQLI", true),
        ("198.51.100.23", "XSS", true),
        ("203.0.113.7", "SQLI", true),
        ("192.0.2.99", "BRUTE_FORCE", true),
        ("192.0.2.99", "BRUTE_FORCE", true),
        ("198.51.100.23", "XSS", true),
        ("192.0.2.99", "BRUTE_FORCE", true),
        ("10.0.0.8", "BENIGN", false),
        ("203.0.113.7", "SSI", true),
        ("10.0.0.8", "BENIGN", false),
        ("192.0.2.99", "BRUTE_FORCE", true),
    ];

    println!("Ingesting {} classification events...", script.len());
    for (identity, attack_type, malicious) in script {
        let record = service.submit_raw(&serde_json::json!({
            "identity": identity,
            "attack_type": attack_type,
            "malicious": malicious,
        }))?;
        println!(
            "  [{}] {:<14} {:<12} {:>3} -> {:<3} hash {}...",
            record.sequence,
            record.identity,
            record.attack_type,
            record.old_score,
            record.new_score,
            &record.hash[..12]
        );
    }

    println!();
    run_stats(cli, 5)?;
    run_verify(cli, false)
}

fn run_list(cli: &Cli, skip: u64, limit: u64, identity: Option<String>) -> LedgerResult<()> {
    let store = open_store(cli)?;
    let service = QueryService::new(store, open_verifier(cli)?);
    let listing = service.list_records(&RangeQuery { skip, limit, identity })?;

    println!(
        "Records {}..{} of {} (chain integrity: {})",
        listing.skip,
        listing.skip + listing.records.len() as u64,
        listing.total,
        listing.chain_integrity
    );
    for record in &listing.records {
        println!(
            "  [{}] {} {:<14} {:<12} {:>3} -> {:<3} malicious={}",
            record.sequence,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.identity,
            record.attack_type,
            record.old_score,
            record.new_score,
            record.malicious
        );
    }
    Ok(())
}

fn run_stats(cli: &Cli, top: usize) -> LedgerResult<()> {
    let store = open_store(cli)?;
    let service = QueryService::new(store, open_verifier(cli)?);
    let view = service.analytics(top)?;

    println!(
        "Ledger: {} records across {} identities (chain integrity: {})",
        view.total_records, view.total_identities, view.chain_integrity
    );
    println!("Score bands:");
    for (band, count) in &view.score_band_distribution {
        println!("  {:<12} {}", band, count);
    }
    println!("Attack types:");
    for (attack_type, count) in &view.attack_type_distribution {
        println!("  {:<12} {}", attack_type, count);
    }
    println!("Top threats:");
    for threat in &view.top_threats {
        println!(
            "  {:<14} score {:>3} [{}]{}",
            threat.identity,
            threat.score,
            threat.band,
            if threat.flagged { " FLAGGED" } else { "" }
        );
    }
    Ok(())
}

fn run_verify(cli: &Cli, full: bool) -> LedgerResult<()> {
    let store = open_store(cli)?;
    let verifier = open_verifier(cli)?;

    let result = if full {
        verifier.verify_full(store.as_ref())?
    } else {
        verifier.verify_incremental(store.as_ref())?
    };
    checkpoint::save(&checkpoint_path(cli), &result.checkpoint)?;

    match result.first_break {
        None => println!(
            "Chain OK: {} records checked this pass, {} verified in total",
            result.records_checked, result.checkpoint.sequence
        ),
        Some(sequence) => println!(
            "CHAIN BROKEN at sequence {} ({} records checked before the break)",
            sequence, result.records_checked
        ),
    }
    Ok(())
}

fn run_export(cli: &Cli, identity: Option<String>) -> LedgerResult<()> {
    let store = open_store(cli)?;
    let service = QueryService::new(store, open_verifier(cli)?);

    for record in service.export(identity) {
        let record = record?;
        let line = serde_json::to_string(&record).map_err(|e| LedgerError::Storage {
            reason: format!("failed to serialize record {}: {}", record.sequence, e),
        })?;
        println!("{}", line);
    }
    Ok(())
}
