//! Constraint compiler. Every hard rule category is an independent unit that
//! reads the catalog and the shared variable space and appends rows.

mod basic;
mod cross;
mod daily;
mod joint;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::model::{Category, Model, ModelBuilder};
use crate::objective;
use crate::space::VarSpace;

pub use basic::{Load, PinnedSlots, SlotExclusivity};
pub use cross::{Implications, MutualExclusions, OverlapCounts, RequiresAnyRules, Syncs};
pub(crate) use daily::day_vars;
pub use daily::{DailyCap, DoubleDayCount, SameDayAdjacency};
pub use joint::{JointSync, TeacherNonOverlap};

pub trait RuleCategory {
    fn category(&self) -> Category;

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder);
}

/// All hard categories in compilation order.
pub fn categories() -> Vec<Box<dyn RuleCategory>> {
    vec![
        Box::new(Load),
        Box::new(SlotExclusivity),
        Box::new(JointSync),
        Box::new(TeacherNonOverlap),
        Box::new(Implications),
        Box::new(Syncs),
        Box::new(OverlapCounts),
        Box::new(RequiresAnyRules),
        Box::new(PinnedSlots),
        Box::new(SameDayAdjacency),
        Box::new(DailyCap),
        Box::new(DoubleDayCount),
        Box::new(MutualExclusions),
    ]
}

/// Builds the full model: hard categories, then the objective.
pub fn compile(catalog: &Catalog, space: VarSpace) -> Model {
    let mut out = ModelBuilder::new(&space);
    for unit in categories() {
        let before = out.row_count();
        unit.compile(catalog, &space, &mut out);
        debug!(category = %unit.category(), rows = out.row_count() - before, "compiled category");
    }
    objective::compile(catalog, &space, &mut out);
    let model = out.finish(space);
    info!(
        vars = model.space.len(),
        aux = model.aux.len(),
        rows = model.constraints.len(),
        objective_terms = model.objective.len(),
        "model compiled"
    );
    model
}
