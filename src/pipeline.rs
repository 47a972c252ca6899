use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::bronze::{compute_checksum, latest_bronze_file, load_payload, RawPayload};
use crate::cleaner::{clean_accounts, clean_transactions, CleaningReport};
use crate::db::{self, ACCOUNTS_TABLE, TRANSACTIONS_TABLE};
use crate::error::{BankflowError, Result};
use crate::flatten::{normalize_accounts, transactions_table};
use crate::logging::{run_timestamp, with_run_logging, RunContext};
use crate::metadata::{append_entry, MetadataEntry, RunStatus};
use crate::models::{Table, ACCOUNT_COLUMNS, TRANSACTION_COLUMNS};
use crate::schema::enforce_schema;
use crate::settings::Layout;
use crate::writer::{write_silver, SilverOutput};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub load_warehouse: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            load_warehouse: true,
        }
    }
}

/// The two cleaned tables of one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SilverTables {
    pub transactions: Table,
    pub accounts: Table,
    pub report: CleaningReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: SilverOutput,
    pub report: CleaningReport,
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    NoInput,
    Completed(RunSummary),
}

/// Flatten, enforce and clean both tables of a payload.
pub fn transform_payload(payload: &RawPayload) -> SilverTables {
    let tx = enforce_schema(transactions_table(&payload.transactions), TRANSACTION_COLUMNS);
    let (transactions, report) = clean_transactions(tx);

    let acc = enforce_schema(normalize_accounts(&payload.accounts), ACCOUNT_COLUMNS);
    let accounts = clean_accounts(acc);

    SilverTables {
        transactions,
        accounts,
        report,
    }
}

fn load_warehouse(ctx: &RunContext, warehouse: &Path, tables: &SilverTables) -> Result<()> {
    let mut conn = db::get_connection(warehouse)?;
    db::init_db(&conn)?;
    let n = db::insert_table(&mut conn, TRANSACTIONS_TABLE, &tables.transactions)?;
    info!(parent: &ctx.span, "Inserted {n} rows into {TRANSACTIONS_TABLE}");
    let n = db::insert_table(&mut conn, ACCOUNTS_TABLE, &tables.accounts)?;
    info!(parent: &ctx.span, "Inserted {n} rows into {ACCOUNTS_TABLE}");
    Ok(())
}

/// Process one bronze file end to end.
pub fn process_file(
    ctx: &RunContext,
    input: &Path,
    layout: &Layout,
    opts: RunOptions,
) -> Result<RunSummary> {
    info!(parent: &ctx.span, "Processing file: {}", input.display());
    let payload = load_payload(input)?;
    info!(
        parent: &ctx.span,
        "Loaded {} transactions and {} accounts",
        payload.transactions.len(),
        payload.accounts.len()
    );

    let tables = transform_payload(&payload);
    if tables.report.dropped() > 0 {
        warn!(
            parent: &ctx.span,
            "Dropped {} transactions: {} with missing or negative amount, {} without a usable date",
            tables.report.dropped(),
            tables.report.dropped_amount,
            tables.report.dropped_date
        );
    }

    let output = write_silver(
        &layout.silver_dir,
        &ctx.timestamp,
        &tables.transactions,
        &tables.accounts,
    )?;
    info!(parent: &ctx.span, "Saved cleaned transactions to {}", output.transactions.path.display());
    info!(parent: &ctx.span, "Saved cleaned accounts to {}", output.accounts.path.display());

    if opts.load_warehouse {
        load_warehouse(ctx, &layout.warehouse, &tables)?;
    }

    Ok(RunSummary {
        input: input.to_path_buf(),
        output,
        report: tables.report,
        loaded: opts.load_warehouse,
    })
}

fn record_failure(ctx: &RunContext, layout: &Layout, mut entry: MetadataEntry, e: &BankflowError) {
    error!(parent: &ctx.span, "Silver layer failed: {e}");
    entry.status = RunStatus::Failed;
    entry.error_message = Some(e.to_string());
    if let Err(log_err) = append_entry(&layout.metadata_log, &entry) {
        error!(parent: &ctx.span, "Could not write metadata log: {log_err}");
    }
}

/// One silver run against the latest bronze file, recorded in the metadata
/// log whether it succeeds or fails.
pub fn run_with_context(ctx: &RunContext, layout: &Layout, opts: RunOptions) -> Result<RunOutcome> {
    info!(parent: &ctx.span, "Silver layer processing started.");

    let mut entry = MetadataEntry {
        filename: layout.bronze_dir.to_string_lossy().to_string(),
        timestamp: ctx.timestamp.clone(),
        records: 0,
        status: RunStatus::Success,
        checksum: None,
        error_message: None,
    };

    let input = match latest_bronze_file(&layout.bronze_dir) {
        Ok(Some(input)) => input,
        Ok(None) => {
            warn!(parent: &ctx.span, "No JSON file found in bronze layer.");
            return Ok(RunOutcome::NoInput);
        }
        Err(e) => {
            record_failure(ctx, layout, entry, &e);
            return Err(e);
        }
    };
    entry.filename = input.to_string_lossy().to_string();
    entry.checksum = compute_checksum(&input).ok();

    match process_file(ctx, &input, layout, opts) {
        Ok(summary) => {
            entry.records = summary.output.transactions.rows;
            append_entry(&layout.metadata_log, &entry)?;
            info!(parent: &ctx.span, "Metadata logged for {}", entry.filename);
            info!(parent: &ctx.span, "Silver layer completed successfully!");
            Ok(RunOutcome::Completed(summary))
        }
        Err(e) => {
            record_failure(ctx, layout, entry, &e);
            Err(e)
        }
    }
}

/// Run with a fresh timestamp and a per-run log file.
pub fn run_silver(layout: &Layout, opts: RunOptions) -> Result<RunOutcome> {
    let timestamp = run_timestamp();
    with_run_logging(&layout.log_dir, &timestamp, || {
        let ctx = RunContext::new(timestamp.as_str());
        run_with_context(&ctx, layout, opts)
    })?
}
