use crate::catalog::{Catalog, GroupIx};
use crate::model::{Category, Cmp, LinExpr, ModelBuilder};
use crate::space::VarSpace;

use super::RuleCategory;

/// Σ_T x[G,C,T] == hours(G,C)
pub struct Load;

impl RuleCategory for Load {
    fn category(&self) -> Category {
        Category::Load
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for l in catalog.lesson_ids() {
            let expr = LinExpr::sum(space.of_lesson(l).map(|(_, v)| v));
            out.hard(Category::Load, expr, Cmp::Eq, catalog.lesson(l).hours as i64);
        }
    }
}

/// At most one course per class and slot.
pub struct SlotExclusivity;

impl RuleCategory for SlotExclusivity {
    fn category(&self) -> Category {
        Category::SlotExclusivity
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for g in 0..catalog.groups.len() {
            for s in catalog.slot_ids() {
                let vars = space.at_group(GroupIx(g as u32), s);
                if vars.len() > 1 {
                    out.hard(
                        Category::SlotExclusivity,
                        LinExpr::sum(vars.iter().copied()),
                        Cmp::Le,
                        1,
                    );
                }
            }
        }
    }
}

/// Mandatory pins fix a variable to 1, forbidden pins to 0.
pub struct PinnedSlots;

impl RuleCategory for PinnedSlots {
    fn category(&self) -> Category {
        Category::PinnedSlot
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for l in catalog.lesson_ids() {
            let lesson = catalog.lesson(l);
            for &s in &lesson.mandatory {
                // Catalog::build rejects pins outside the class domain.
                if let Some(v) = space.var(l, s) {
                    out.hard(Category::PinnedSlot, LinExpr::sum([v]), Cmp::Eq, 1);
                }
            }
            for &s in &lesson.forbidden {
                if let Some(v) = space.var(l, s) {
                    out.hard(Category::PinnedSlot, LinExpr::sum([v]), Cmp::Eq, 0);
                }
            }
        }
    }
}
