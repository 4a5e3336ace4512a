use types::DoubleDays;

use crate::catalog::{Catalog, LessonIx, SlotIx};
use crate::model::{AuxKind, Category, Cmp, LinExpr, ModelBuilder};
use crate::space::{VarId, VarSpace};

use super::RuleCategory;

/// Variables of `lesson` on `day`, in period order.
pub(crate) fn day_vars(
    catalog: &Catalog,
    space: &VarSpace,
    lesson: LessonIx,
    day: usize,
) -> Vec<(SlotIx, VarId)> {
    catalog
        .day_range(day)
        .filter_map(|s| {
            let s = SlotIx(s as u32);
            space.var(lesson, s).map(|v| (s, v))
        })
        .collect()
}

pub struct DailyCap;

impl RuleCategory for DailyCap {
    fn category(&self) -> Category {
        Category::DailyCap
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for l in catalog.lesson_ids() {
            let cap = catalog.lesson(l).daily_cap as usize;
            for day in 0..catalog.days() {
                let vars = day_vars(catalog, space, l, day);
                if vars.len() > cap {
                    out.hard(
                        Category::DailyCap,
                        LinExpr::sum(vars.into_iter().map(|(_, v)| v)),
                        Cmp::Le,
                        cap as i64,
                    );
                }
            }
        }
    }
}

/// Two same-day periods of a lesson must be neighbours: every non-adjacent
/// pair on one day is forbidden. Days with a single occurrence are untouched.
pub struct SameDayAdjacency;

impl RuleCategory for SameDayAdjacency {
    fn category(&self) -> Category {
        Category::SameDayAdjacency
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for l in catalog.lesson_ids() {
            if catalog.lesson(l).daily_cap < 2 {
                continue;
            }
            for day in 0..catalog.days() {
                let vars = day_vars(catalog, space, l, day);
                for (i, &(p, a)) in vars.iter().enumerate() {
                    for &(q, b) in &vars[i + 1..] {
                        if q.0 > p.0 + 1 {
                            out.hard(
                                Category::SameDayAdjacency,
                                LinExpr::sum([a, b]),
                                Cmp::Le,
                                1,
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Number of days carrying two periods of a lesson, via h[day] = (count == 2).
pub struct DoubleDayCount;

impl RuleCategory for DoubleDayCount {
    fn category(&self) -> Category {
        Category::DoubleDays
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for l in catalog.lesson_ids() {
            let (cmp, rhs) = match catalog.lesson(l).double_days {
                DoubleDays::Unrestricted => continue,
                DoubleDays::AtMostOne => (Cmp::Le, 1),
                DoubleDays::ExactlyOne => (Cmp::Eq, 1),
            };
            let mut doubles = LinExpr::new();
            for day in 0..catalog.days() {
                let vars = day_vars(catalog, space, l, day);
                if vars.len() < 2 {
                    continue;
                }
                let h = out.add_aux(AuxKind::Binary);
                let count = LinExpr::sum(vars.into_iter().map(|(_, v)| v));
                // h = 1 forces two periods, two periods force h = 1
                out.hard(Category::DoubleDays, count.clone().add(h, -2), Cmp::Ge, 0);
                out.hard(Category::DoubleDays, count.add(h, -1), Cmp::Le, 1);
                doubles.push(h, 1);
            }
            out.hard(Category::DoubleDays, doubles, cmp, rhs);
        }
    }
}
