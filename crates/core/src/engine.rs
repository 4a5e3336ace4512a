use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};
use types::{Roster, SolveParams, SolveReport, SolveStatus};

use crate::assignment::Assignment;
use crate::catalog::Catalog;
use crate::compile::compile;
use crate::diagnostics::stats;
use crate::error::EngineError;
use crate::model::Model;
use crate::scoring::compute_soft_scores;
use crate::space::VarSpace;
use crate::validator::validate;

/// What a backend hands back. `values` holds one entry per model column
/// whenever an incumbent exists.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendOutcome {
    pub status: SolveStatus,
    pub values: Option<Vec<f64>>,
    pub objective: Option<f64>,
    pub best_bound: Option<f64>,
}

impl BackendOutcome {
    pub fn without_solution(status: SolveStatus) -> Self {
        Self {
            status,
            values: None,
            objective: None,
            best_bound: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} backend failed: {message}")]
    Failed {
        backend: &'static str,
        message: String,
    },
    #[error("backend returned {got} values for {expected} columns")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("backend reported {status} without values")]
    MissingValues { status: SolveStatus },
}

/// A MILP solver treated as a black box: one blocking call bounded by
/// `params.time_limit_sec`.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model, params: &SolveParams) -> Result<BackendOutcome, BackendError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Built,
    Solving,
    Done(SolveStatus),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Built => f.write_str("built"),
            Phase::Solving => f.write_str("solving"),
            Phase::Done(status) => write!(f, "done({status})"),
        }
    }
}

/// Catalog and compiled model for one roster, ready to solve.
#[derive(Clone, Debug)]
pub struct Prepared {
    pub catalog: Catalog,
    pub model: Model,
}

pub struct Engine<B> {
    backend: B,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn prepare(&self, roster: &Roster) -> Result<Prepared, EngineError> {
        let catalog = Catalog::build(roster)?;
        let space = VarSpace::build(&catalog)?;
        let model = compile(&catalog, space);
        info!(phase = %Phase::Built, columns = model.columns(), "model ready");
        Ok(Prepared { catalog, model })
    }

    pub fn run(&self, roster: &Roster, params: &SolveParams) -> Result<SolveReport, EngineError> {
        let started = Instant::now();
        let prepared = self.prepare(roster)?;
        self.solve(&prepared, params, started)
    }

    /// Built → Solving → terminal status. A produced assignment is validated
    /// before it is returned; any defect aborts with [`EngineError::Validation`].
    pub fn solve(
        &self,
        prepared: &Prepared,
        params: &SolveParams,
        started: Instant,
    ) -> Result<SolveReport, EngineError> {
        let Prepared { catalog, model } = prepared;
        info!(
            phase = %Phase::Solving,
            backend = self.backend.name(),
            time_limit_sec = params.time_limit_sec,
            "solve started"
        );
        let outcome = self.backend.solve(model, params)?;

        let mut status = outcome.status;
        let values = match outcome.values {
            Some(values) if values.len() != model.columns() => {
                return Err(BackendError::ShapeMismatch {
                    expected: model.columns(),
                    got: values.len(),
                }
                .into());
            }
            Some(values) if status != SolveStatus::Infeasible => {
                if status == SolveStatus::Unknown {
                    warn!("time budget exhausted with an incumbent, reporting it as feasible");
                    status = SolveStatus::Feasible;
                }
                Some(values)
            }
            None if status.has_solution() => {
                return Err(BackendError::MissingValues { status }.into());
            }
            _ => None,
        };

        let mut report = SolveReport {
            status,
            objective: None,
            best_bound: outcome.best_bound,
            timetable: Vec::new(),
            soft: None,
            stats: stats(model),
            elapsed_ms: 0,
        };

        if let Some(values) = values {
            let assignment = Assignment::from_values(&model.space, &values);
            let defects = validate(catalog, &assignment);
            if !defects.is_empty() {
                for d in &defects {
                    error!(category = %d.category(), "{d}");
                }
                return Err(EngineError::Validation { defects });
            }
            report.objective = Some(outcome.objective.unwrap_or_else(|| model.objective_value(&values)));
            report.soft = Some(compute_soft_scores(catalog, &assignment));
            report.timetable = assignment.to_timetable(catalog);
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            phase = %Phase::Done(report.status),
            objective = ?report.objective,
            best_bound = ?report.best_bound,
            lessons = report.timetable.len(),
            elapsed_ms = report.elapsed_ms,
            "solve finished"
        );
        Ok(report)
    }
}
