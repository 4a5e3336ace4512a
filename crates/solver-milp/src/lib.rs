#[cfg(not(any(feature = "microlp", feature = "with-milp")))]
compile_error!("enable the `microlp` or the `with-milp` feature of solver-milp");

mod milp_core;

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use good_lp::{default_solver, ProblemVariables, ResolutionError, Solution, SolverModel};
use timetable_core::model::Model;
use timetable_core::{Backend, BackendError, BackendOutcome};
use tracing::{debug, info, warn};
use types::{SolveParams, SolveStatus};

use milp_core::*;

const BACKEND: &str = "milp";

/// `good_lp` backend. Uses COIN-OR CBC with the `with-milp` feature and the
/// pure-Rust microlp solver otherwise.
#[derive(Clone, Debug, Default)]
pub struct MilpSolver {
    /// Extra wall-clock time granted over the budget before giving up on the
    /// worker thread.
    pub grace: Duration,
}

impl MilpSolver {
    pub fn new() -> Self {
        Self {
            grace: Duration::from_secs(5),
        }
    }

    /// Wall-clock wait for the worker: the solver budget plus `grace`,
    /// saturating for very large limits.
    fn budget(&self, params: &SolveParams) -> Duration {
        Duration::from_secs(params.time_limit_sec).saturating_add(self.grace)
    }
}

impl Backend for MilpSolver {
    fn name(&self) -> &'static str {
        if cfg!(feature = "with-milp") {
            "coin_cbc"
        } else {
            "microlp"
        }
    }

    fn solve(&self, model: &Model, params: &SolveParams) -> Result<BackendOutcome, BackendError> {
        info!(
            backend = self.name(),
            columns = model.columns(),
            rows = model.constraints.len(),
            "translating model"
        );
        if !trivial_rows_hold(model) {
            info!("model contains an unsatisfiable constant row");
            return Ok(BackendOutcome::without_solution(SolveStatus::Infeasible));
        }

        // The solve runs on a worker so the budget also bounds solvers without
        // a native time limit.
        let worker_model = model.clone();
        let worker_params = params.clone();
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("milp-solve".into())
            .spawn(move || {
                let _ = tx.send(solve_blocking(&worker_model, &worker_params));
            })
            .map_err(|e| BackendError::Failed {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        await_worker(rx, worker, self.budget(params))
    }
}

type WorkerResult = Result<BackendOutcome, BackendError>;

/// Waits up to `budget` for the worker's outcome. A timed-out worker cannot be
/// interrupted and keeps running until its solver returns.
fn await_worker(
    rx: mpsc::Receiver<WorkerResult>,
    worker: JoinHandle<()>,
    budget: Duration,
) -> WorkerResult {
    match rx.recv_timeout(budget) {
        Ok(outcome) => {
            let _ = worker.join();
            outcome
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(
                budget_sec = budget.as_secs(),
                worker = ?worker.thread().id(),
                "time budget exhausted without a result, solver thread left running"
            );
            Ok(BackendOutcome::without_solution(SolveStatus::Unknown))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let message = if worker.join().is_err() {
                "solver thread panicked"
            } else {
                "solver thread exited without a result"
            };
            Err(BackendError::Failed {
                backend: BACKEND,
                message: message.into(),
            })
        }
    }
}

fn solve_blocking(model: &Model, params: &SolveParams) -> Result<BackendOutcome, BackendError> {
    let mut pvars = ProblemVariables::new();
    let cols = declare_columns(model, &mut pvars);
    let objective = build_objective(model, &cols);

    let problem = pvars.maximise(objective.clone()).using(default_solver);
    let problem = configure(problem, params);
    let problem = add_rows(problem, model, &cols);

    match problem.solve() {
        Ok(sol) => {
            let values = extract_values(&sol, &cols);
            let (proven, best_bound) = proof(&sol);
            if !proven && !satisfies(model, &values) {
                warn!("solver stopped without a usable incumbent");
                return Ok(BackendOutcome::without_solution(SolveStatus::Unknown));
            }
            let status = if proven {
                SolveStatus::Optimal
            } else {
                SolveStatus::Feasible
            };
            let objective = sol.eval(objective.clone());
            debug!(%status, objective, "solver returned");
            Ok(BackendOutcome {
                status,
                values: Some(values),
                objective: Some(objective),
                best_bound: best_bound.or(if proven { Some(objective) } else { None }),
            })
        }
        Err(ResolutionError::Infeasible) => {
            Ok(BackendOutcome::without_solution(SolveStatus::Infeasible))
        }
        Err(e) => {
            warn!(error = %e, "solver failed");
            Err(BackendError::Failed {
                backend: BACKEND,
                message: e.to_string(),
            })
        }
    }
}

#[cfg(feature = "with-milp")]
fn configure(
    mut problem: good_lp::solvers::coin_cbc::CoinCbcProblem,
    params: &SolveParams,
) -> good_lp::solvers::coin_cbc::CoinCbcProblem {
    problem.set_parameter("sec", &params.time_limit_sec.to_string());
    if let Some(threads) = params.threads {
        problem.set_parameter("threads", &threads.to_string());
    }
    problem.set_parameter("log", if params.log_solver { "1" } else { "0" });
    problem
}

#[cfg(not(feature = "with-milp"))]
fn configure<M: SolverModel>(problem: M, params: &SolveParams) -> M {
    if params.threads.is_some() || params.log_solver {
        debug!("thread count and solver log are not supported by microlp");
    }
    problem
}

/// Whether the incumbent is proven optimal, and the proven bound if known.
#[cfg(feature = "with-milp")]
fn proof(sol: &good_lp::solvers::coin_cbc::CoinCbcSolution) -> (bool, Option<f64>) {
    let raw = sol.model();
    (raw.is_proven_optimal(), Some(raw.best_possible_value()))
}

#[cfg(not(feature = "with-milp"))]
fn proof<S>(_: &S) -> (bool, Option<f64>) {
    // microlp only returns after closing its branch-and-bound tree
    (true, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_saturates_instead_of_overflowing() {
        let solver = MilpSolver::new();
        let params = SolveParams {
            time_limit_sec: u64::MAX,
            ..SolveParams::default()
        };
        assert_eq!(solver.budget(&params), Duration::MAX);

        let params = SolveParams {
            time_limit_sec: 10,
            ..SolveParams::default()
        };
        assert_eq!(solver.budget(&params), Duration::from_secs(15));
    }

    fn worker(delay: Duration, send: bool) -> (mpsc::Receiver<WorkerResult>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            thread::sleep(delay);
            if send {
                let _ = tx.send(Ok(BackendOutcome::without_solution(SolveStatus::Infeasible)));
            }
        });
        (rx, handle)
    }

    #[test]
    fn slow_worker_yields_unknown() {
        let (rx, handle) = worker(Duration::from_millis(500), true);
        let outcome = await_worker(rx, handle, Duration::from_millis(10)).unwrap();
        assert_eq!(outcome.status, SolveStatus::Unknown);
        assert!(outcome.values.is_none());
    }

    #[test]
    fn finished_worker_is_joined() {
        let (rx, handle) = worker(Duration::ZERO, true);
        let outcome = await_worker(rx, handle, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn silent_worker_is_a_failure() {
        let (rx, handle) = worker(Duration::ZERO, false);
        let err = await_worker(rx, handle, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, BackendError::Failed { .. }));
    }
}
