use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use timetable_cli::{input, render};
use timetable_core::{precheck, Engine, SolveParams};
use timetable_solver_milp::MilpSolver;
use tracing::warn;

#[derive(Clone, Copy, ValueEnum)]
pub enum View {
    Grid,
    Slots,
    Summary,
}

#[derive(Args)]
pub struct SolveArgs {
    /// Roster JSON file
    roster: PathBuf,
    /// Wall-clock budget for the solver, in seconds
    #[arg(long, env = "TIMETABLE_TIME_LIMIT", default_value_t = 300)]
    time_limit: u64,
    #[arg(long, env = "TIMETABLE_THREADS")]
    threads: Option<u32>,
    /// Forward the solver's own log to stdout
    #[arg(long)]
    log_solver: bool,
    /// Write the full report as JSON
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = View::Grid)]
    view: View,
}

pub fn run(args: SolveArgs) -> Result<()> {
    let started = Instant::now();
    let roster = input::load_roster(&args.roster)?;
    let engine = Engine::new(MilpSolver::new());
    let prepared = engine.prepare(&roster)?;
    for finding in precheck(&prepared.catalog).findings {
        warn!(%finding, "pre-check");
    }

    let params = SolveParams {
        time_limit_sec: args.time_limit,
        threads: args.threads,
        log_solver: args.log_solver,
    };
    let report = engine.solve(&prepared, &params, started)?;

    if let Some(path) = &args.out {
        input::write_json(path, &report)?;
    }
    print!("{}", render::summary(&report));
    if !report.status.has_solution() {
        bail!("no timetable found ({})", report.status);
    }
    match args.view {
        View::Grid => print!("\n{}", render::class_grids(&roster, &report.timetable)),
        View::Slots => print!("\n{}", render::slot_view(&roster.grid, &report.timetable)),
        View::Summary => {}
    }
    Ok(())
}
