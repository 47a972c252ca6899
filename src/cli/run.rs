use crate::error::Result;
use crate::pipeline::{run_silver, RunOptions, RunOutcome};
use crate::settings::resolve_layout;

pub fn run(data_dir: Option<&str>, no_load: bool) -> Result<()> {
    let layout = resolve_layout(data_dir);
    let opts = RunOptions {
        load_warehouse: !no_load,
    };

    match run_silver(&layout, opts)? {
        RunOutcome::NoInput => {
            println!("No bronze file found in {}", layout.bronze_dir.display());
        }
        RunOutcome::Completed(summary) => {
            println!("Input:         {}", summary.input.display());
            println!(
                "Transactions:  {} rows -> {}",
                summary.output.transactions.rows,
                summary.output.transactions.path.display()
            );
            println!(
                "Accounts:      {} rows -> {}",
                summary.output.accounts.rows,
                summary.output.accounts.path.display()
            );
            println!(
                "Dropped:       {} (amount), {} (date)",
                summary.report.dropped_amount, summary.report.dropped_date
            );
            if summary.loaded {
                println!("Warehouse:     {}", layout.warehouse.display());
            }
        }
    }
    Ok(())
}
