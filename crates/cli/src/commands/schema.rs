use anyhow::Result;
use clap::{Args, ValueEnum};
use schemars::schema_for;
use types::{Roster, SolveReport};

#[derive(Clone, Copy, ValueEnum)]
pub enum Target {
    Roster,
    Report,
}

#[derive(Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = Target::Roster)]
    target: Target,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = match args.target {
        Target::Roster => schema_for!(Roster),
        Target::Report => schema_for!(SolveReport),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
