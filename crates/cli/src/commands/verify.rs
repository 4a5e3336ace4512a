use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use timetable_cli::{input, render};
use timetable_core::verify;

#[derive(Args)]
pub struct VerifyArgs {
    /// Roster JSON file
    roster: PathBuf,
    /// Solve report or bare list of scheduled lessons
    timetable: PathBuf,
    #[arg(long)]
    json: bool,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let roster = input::load_roster(&args.roster)?;
    let timetable = input::load_timetable(&args.timetable)?;
    let result = verify(&roster, &timetable)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render::verification(&result));
    }
    if !result.defects.is_empty() {
        bail!("timetable violates {} hard rule(s)", result.defects.len());
    }
    Ok(())
}
