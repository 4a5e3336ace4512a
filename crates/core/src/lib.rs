pub mod assignment;
pub mod catalog;
pub mod compile;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod model;
pub mod objective;
pub mod scoring;
pub mod space;
pub mod validator;

pub use assignment::Assignment;
pub use catalog::Catalog;
pub use compile::compile;
pub use diagnostics::{precheck, stats, FeasibilityReport, Finding};
pub use engine::{Backend, BackendError, BackendOutcome, Engine, Phase, Prepared};
pub use error::{EngineError, StructuralError};
pub use model::{Category, Model};
pub use scoring::compute_soft_scores;
pub use space::VarSpace;
pub use validator::{validate, Defect};

pub use types::{
    Roster, ScheduledLesson, SoftBreakdown, SolveParams, SolveReport, SolveStatus, TimeSlot,
};

/// Validation and soft score of an existing timetable against a roster.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Verification {
    pub defects: Vec<Defect>,
    pub soft: SoftBreakdown,
}

pub fn verify(roster: &Roster, timetable: &[ScheduledLesson]) -> Result<Verification, EngineError> {
    let catalog = Catalog::build(roster)?;
    let assignment = Assignment::from_timetable(&catalog, timetable)?;
    Ok(Verification {
        defects: validate(&catalog, &assignment),
        soft: compute_soft_scores(&catalog, &assignment),
    })
}
