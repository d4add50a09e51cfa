//! `folio commons`: evaluate commons promotion for a usage report.

use folio_build::commons::{UsageRecord, decide};

use crate::cli::CommonsArgs;
use crate::commands::utils::to_json;
use crate::error::{Result, ResultExt};

pub fn execute(args: CommonsArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.usage).with_path(&args.usage)?;
    let usage: Vec<UsageRecord> =
        serde_json::from_str(&content).context(format!("invalid usage report {}", args.usage.display()))?;

    let decisions = decide(&usage, args.pages);
    println!("{}", to_json(&decisions, args.compact)?);
    Ok(())
}
