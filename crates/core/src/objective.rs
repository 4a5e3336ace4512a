//! Objective compiler. Every soft family creates indicator or excess columns,
//! links them to `x` with soft rows, and registers them through
//! [`ModelBuilder::reward`].

use tracing::debug;

use crate::catalog::{Catalog, SlotIx, TeacherIx};
use crate::compile::day_vars;
use crate::model::{AuxKind, Cmp, Family, LinExpr, ModelBuilder, Origin};
use crate::space::{VarId, VarSpace};

pub fn compile(catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
    consecutive(catalog, space, out);
    bundles(catalog, space, out);
    teacher_load(catalog, space, out);
}

/// c[l,day,p] = x[l,p] AND x[l,p+1], weighted per lesson.
fn consecutive(catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
    let origin = Origin::Soft(Family::Consecutive);
    let mut terms = 0usize;
    for &(l, weight) in &catalog.prefs.consecutive {
        for day in 0..catalog.days() {
            let vars = day_vars(catalog, space, l, day);
            for pair in vars.windows(2) {
                let [(p, a), (q, b)] = [pair[0], pair[1]];
                if q.0 != p.0 + 1 {
                    continue;
                }
                let c = out.add_aux(AuxKind::Binary);
                out.push(origin, LinExpr::sum([c]).add(a, -1), Cmp::Le, 0);
                out.push(origin, LinExpr::sum([c]).add(b, -1), Cmp::Le, 0);
                out.push(origin, LinExpr::sum([c]).add(a, -1).add(b, -1), Cmp::Ge, -1);
                out.reward(Family::Consecutive, c, weight);
                terms += 1;
            }
        }
    }
    debug!(terms, "consecutive pairs");
}

/// Per (group, day): reward reaching `min_per_day` bundle periods, and
/// optionally penalise periods over `max_per_day`.
fn bundles(catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
    for bundle in &catalog.prefs.bundles {
        let min = bundle.min_per_day as i64;
        for (_, lessons) in &bundle.groups {
            for day in 0..catalog.days() {
                let vars: Vec<VarId> = lessons
                    .iter()
                    .flat_map(|&l| day_vars(catalog, space, l, day))
                    .map(|(_, v)| v)
                    .collect();
                let n = vars.len() as i64;
                let count = LinExpr::sum(vars);

                if bundle.reward != 0 && n >= min {
                    let origin = Origin::Soft(Family::BundleDay);
                    let b = out.add_aux(AuxKind::Binary);
                    out.push(origin, count.clone().add(b, -min), Cmp::Ge, 0);
                    out.push(origin, count.clone().add(b, -n), Cmp::Le, min - 1);
                    out.reward(Family::BundleDay, b, bundle.reward);
                }
                if let Some(max) = bundle.max_per_day {
                    excess(out, Family::BundleExcess, &count, n, max as i64, bundle.excess_weight);
                }
            }
        }
        debug!(bundle = %bundle.name, "daily bundle compiled");
    }
}

fn teacher_load(catalog: &Catalog, space: &VarSpace, out: &mut ModelBuilder) {
    let load = &catalog.prefs.teacher_load;
    let weight = load.weight as i64;
    if weight == 0 {
        return;
    }
    for t in 0..catalog.teachers.len() {
        let t = TeacherIx(t as u32);
        if let Some(max) = load.max_per_day {
            for day in 0..catalog.days() {
                let vars: Vec<VarId> = catalog
                    .day_range(day)
                    .flat_map(|s| space.at_teacher(t, SlotIx(s as u32)).iter().copied())
                    .collect();
                let n = vars.len() as i64;
                excess(out, Family::TeacherDaily, &LinExpr::sum(vars), n, max as i64, weight);
            }
        }
        if let Some(max) = load.max_first_period_days {
            let vars: Vec<VarId> = (0..catalog.days())
                .flat_map(|day| space.at_teacher(t, catalog.first_period(day)).iter().copied())
                .collect();
            let n = vars.len() as i64;
            excess(out, Family::TeacherFirstPeriod, &LinExpr::sum(vars), n, max as i64, weight);
        }
    }
}

/// e >= count - cap, e >= 0, weighted by a non-positive `weight`. Skipped
/// when `count` can never exceed `cap`.
fn excess(out: &mut ModelBuilder, family: Family, count: &LinExpr, n: i64, cap: i64, weight: i64) {
    if weight == 0 || n <= cap {
        return;
    }
    let e = out.add_aux(AuxKind::NonNegative);
    let mut row = LinExpr::sum([e]);
    for &(c, k) in &count.terms {
        row.push(c, -k);
    }
    out.push(Origin::Soft(family), row, Cmp::Ge, -cap);
    out.reward(family, e, weight);
}
