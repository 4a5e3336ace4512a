use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use timetable_cli::{input, render};
use timetable_core::{compile, precheck, stats, Catalog, VarSpace};

#[derive(Args)]
pub struct CheckArgs {
    /// Roster JSON file
    roster: PathBuf,
    /// Print the findings and statistics as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let roster = input::load_roster(&args.roster)?;
    let catalog = Catalog::build(&roster)?;
    let report = precheck(&catalog);
    // a lesson without enough open slots has no model to measure
    let model = match VarSpace::build(&catalog) {
        Ok(space) => Some(stats(&compile(&catalog, space))),
        Err(e) => {
            tracing::warn!(error = %e, "model not built");
            None
        }
    };

    if args.json {
        let body = serde_json::json!({ "findings": report.findings, "stats": model });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render::findings(&report));
        if let Some(model) = &model {
            print!("{}", render::model_stats(model));
        }
    }
    if !report.is_clean() {
        bail!("roster has {} pre-check finding(s)", report.findings.len());
    }
    Ok(())
}
