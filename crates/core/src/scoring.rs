use types::SoftBreakdown;

use crate::assignment::Assignment;
use crate::catalog::{Catalog, SlotIx};

/// Recomputes every objective family from the assignment itself, without
/// solver auxiliaries. At an optimum `objective` equals the solver's value.
pub fn compute_soft_scores(catalog: &Catalog, a: &Assignment) -> SoftBreakdown {
    let mut sc = SoftBreakdown::default();

    for &(l, weight) in &catalog.prefs.consecutive {
        let mut pairs = 0i64;
        for day in 0..catalog.days() {
            let range = catalog.day_range(day);
            for s in range.start..range.end.saturating_sub(1) {
                if a.contains(l, SlotIx(s as u32)) && a.contains(l, SlotIx(s as u32 + 1)) {
                    pairs += 1;
                }
            }
        }
        sc.consecutive_pairs += pairs;
        sc.consecutive += pairs * weight;
    }

    for bundle in &catalog.prefs.bundles {
        for (_, lessons) in &bundle.groups {
            for day in 0..catalog.days() {
                let count: usize = lessons
                    .iter()
                    .map(|&l| a.count_on_day(catalog, l, day))
                    .sum();
                let count = count as i64;
                if bundle.reward != 0 && count >= bundle.min_per_day as i64 {
                    sc.bundle_days += 1;
                    sc.bundle += bundle.reward;
                }
                if let Some(max) = bundle.max_per_day {
                    sc.bundle_excess += (count - max as i64).max(0) * bundle.excess_weight;
                }
            }
        }
    }

    let load = &catalog.prefs.teacher_load;
    if load.weight != 0 {
        for lessons in &catalog.teacher_lessons {
            let busy = |s: SlotIx| lessons.iter().any(|&l| a.contains(l, s));
            if let Some(max) = load.max_per_day {
                for day in 0..catalog.days() {
                    let periods = catalog
                        .day_range(day)
                        .filter(|&s| busy(SlotIx(s as u32)))
                        .count() as i64;
                    sc.teacher_daily_excess += (periods - max as i64).max(0);
                }
            }
            if let Some(max) = load.max_first_period_days {
                let days = (0..catalog.days())
                    .filter(|&day| busy(catalog.first_period(day)))
                    .count() as i64;
                sc.teacher_first_period_excess += (days - max as i64).max(0);
            }
        }
        sc.teacher_load =
            (sc.teacher_daily_excess + sc.teacher_first_period_excess) * load.weight as i64;
    }

    sc.objective = sc.consecutive + sc.bundle + sc.bundle_excess + sc.teacher_load;
    sc
}
