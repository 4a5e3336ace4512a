use crate::catalog::{Catalog, TeacherIx};
use crate::model::{Category, Cmp, LinExpr, ModelBuilder};
use crate::space::VarSpace;

use super::RuleCategory;

/// Members of a joint session take identical slots. A member without a
/// variable at T pins every other member to 0 there.
pub struct JointSync;

impl RuleCategory for JointSync {
    fn category(&self) -> Category {
        Category::JointSync
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for session in &catalog.joint {
            for s in catalog.slot_ids() {
                let vars: Vec<_> = session.members.iter().map(|&m| space.var(m, s)).collect();
                if vars.iter().all(Option::is_some) {
                    let vars: Vec<_> = vars.into_iter().flatten().collect();
                    for &other in &vars[1..] {
                        out.hard(
                            Category::JointSync,
                            LinExpr::sum([vars[0]]).add(other, -1),
                            Cmp::Eq,
                            0,
                        );
                    }
                } else {
                    for v in vars.into_iter().flatten() {
                        out.hard(Category::JointSync, LinExpr::sum([v]), Cmp::Eq, 0);
                    }
                }
            }
        }
    }
}

/// A teacher holds at most one sync unit per slot.
pub struct TeacherNonOverlap;

impl RuleCategory for TeacherNonOverlap {
    fn category(&self) -> Category {
        Category::TeacherNonOverlap
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for t in 0..catalog.teachers.len() {
            for s in catalog.slot_ids() {
                let vars = space.at_teacher(TeacherIx(t as u32), s);
                if vars.len() > 1 {
                    out.hard(
                        Category::TeacherNonOverlap,
                        LinExpr::sum(vars.iter().copied()),
                        Cmp::Le,
                        1,
                    );
                }
            }
        }
    }
}
