//! Rules that tie lessons of different class groups together.
//!
//! A lesson without a variable at a slot is the constant 0 there.

use crate::catalog::{Catalog, RuleKind};
use crate::model::{AuxKind, Category, Cmp, Col, LinExpr, ModelBuilder};
use crate::space::VarSpace;

use super::RuleCategory;

/// x[antecedent,T] <= x[consequent,T]; never the converse.
pub struct Implications;

impl RuleCategory for Implications {
    fn category(&self) -> Category {
        Category::Implication
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for rule in &catalog.rules {
            let RuleKind::Implication {
                antecedent,
                consequent,
            } = rule.kind
            else {
                continue;
            };
            for s in catalog.slot_ids() {
                let Some(a) = space.var(antecedent, s) else {
                    continue;
                };
                let mut expr = LinExpr::sum([a]);
                if let Some(c) = space.var(consequent, s) {
                    expr.push(c, -1);
                }
                out.hard(Category::Implication, expr, Cmp::Le, 0);
            }
        }
    }
}

/// x[left,T] == x[right,T].
pub struct Syncs;

impl RuleCategory for Syncs {
    fn category(&self) -> Category {
        Category::Sync
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for rule in &catalog.rules {
            let RuleKind::Sync { left, right } = rule.kind else {
                continue;
            };
            for s in catalog.slot_ids() {
                let expr = match (space.var(left, s), space.var(right, s)) {
                    (Some(l), Some(r)) => LinExpr::sum([l]).add(r, -1),
                    (Some(v), None) | (None, Some(v)) => LinExpr::sum([v]),
                    (None, None) => continue,
                };
                out.hard(Category::Sync, expr, Cmp::Eq, 0);
            }
        }
    }
}

/// Exactly `count` slots where the series and the union of the overlapping
/// lessons are both scheduled. y[T] = x[T] AND (OR of the others at T).
pub struct OverlapCounts;

impl RuleCategory for OverlapCounts {
    fn category(&self) -> Category {
        Category::OverlapCardinality
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for rule in &catalog.rules {
            let RuleKind::OverlapCount {
                series,
                ref overlapping,
                count,
            } = rule.kind
            else {
                continue;
            };
            let mut total = LinExpr::new();
            for s in catalog.slot_ids() {
                let Some(x) = space.var(series, s) else {
                    continue;
                };
                let others: Vec<_> = overlapping.iter().filter_map(|&o| space.var(o, s)).collect();
                let other: Col = match others.as_slice() {
                    [] => continue,
                    [single] => (*single).into(),
                    many => {
                        let u = out.add_aux(AuxKind::Binary);
                        for &o in many {
                            out.hard(
                                Category::OverlapCardinality,
                                LinExpr::sum([o]).add(u, -1),
                                Cmp::Le,
                                0,
                            );
                        }
                        let mut upper = LinExpr::sum([u]);
                        for &o in many {
                            upper.push(o, -1);
                        }
                        out.hard(Category::OverlapCardinality, upper, Cmp::Le, 0);
                        u
                    }
                };
                let y = out.add_aux(AuxKind::Binary);
                out.hard(
                    Category::OverlapCardinality,
                    LinExpr::sum([y]).add(x, -1),
                    Cmp::Le,
                    0,
                );
                out.hard(
                    Category::OverlapCardinality,
                    LinExpr::sum([y]).add(other, -1),
                    Cmp::Le,
                    0,
                );
                out.hard(
                    Category::OverlapCardinality,
                    LinExpr::sum([y]).add(x, -1).add(other, -1),
                    Cmp::Ge,
                    -1,
                );
                total.push(y, 1);
            }
            // An empty total with a non-zero count is a trivially unsatisfiable row.
            out.hard(Category::OverlapCardinality, total, Cmp::Eq, count as i64);
        }
    }
}

/// x[trigger,T] <= Σ x[any_of,T].
pub struct RequiresAnyRules;

impl RuleCategory for RequiresAnyRules {
    fn category(&self) -> Category {
        Category::RequiresAny
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for rule in &catalog.rules {
            let RuleKind::RequiresAny {
                trigger,
                ref any_of,
            } = rule.kind
            else {
                continue;
            };
            for s in catalog.slot_ids() {
                let Some(t) = space.var(trigger, s) else {
                    continue;
                };
                let mut expr = LinExpr::sum([t]);
                for v in any_of.iter().filter_map(|&o| space.var(o, s)) {
                    expr.push(v, -1);
                }
                out.hard(Category::RequiresAny, expr, Cmp::Le, 0);
            }
        }
    }
}

/// Per pair of groups across the two sides, nothing from one side may share
/// a slot with anything from the other.
pub struct MutualExclusions;

impl RuleCategory for MutualExclusions {
    fn category(&self) -> Category {
        Category::MutualExclusion
    }

    fn compile(&self, catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
        for rule in &catalog.rules {
            let RuleKind::MutualExclusion {
                ref first,
                ref second,
            } = rule.kind
            else {
                continue;
            };
            for (_, left) in first {
                for (_, right) in second {
                    for s in catalog.slot_ids() {
                        let l: Vec<_> = left.iter().filter_map(|&x| space.var(x, s)).collect();
                        let r: Vec<_> = right.iter().filter_map(|&x| space.var(x, s)).collect();
                        if l.is_empty() || r.is_empty() {
                            continue;
                        }
                        out.hard(
                            Category::MutualExclusion,
                            LinExpr::sum(l.into_iter().chain(r)),
                            Cmp::Le,
                            1,
                        );
                    }
                }
            }
        }
    }
}
