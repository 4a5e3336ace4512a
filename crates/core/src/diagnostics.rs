//! Pre-solve feasibility findings and model size statistics, for localising
//! an over-constrained roster without running the solver.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use types::{CourseName, DoubleDays, GroupId, LessonRef, ModelStats, TeacherId, TimeSlot};

use crate::catalog::{Catalog, LessonIx, SlotIx};
use crate::model::{Category, Model, Origin};

pub fn stats(model: &Model) -> ModelStats {
    let mut constraints: BTreeMap<String, usize> = Category::ALL
        .iter()
        .map(|c| (c.name().to_string(), 0))
        .collect();
    for row in &model.constraints {
        if let Origin::Hard(c) = row.origin {
            *constraints.entry(c.name().to_string()).or_default() += 1;
        }
    }
    let mut objective_terms = BTreeMap::new();
    for term in &model.objective {
        *objective_terms
            .entry(term.family.name().to_string())
            .or_default() += 1;
    }
    ModelStats {
        decision_vars: model.space.len(),
        aux_vars: model.aux.len(),
        constraints,
        objective_terms,
        domain_by_group: model.space.domain_by_group().clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// Open slots for the lesson after exclusions, forbidden slots and
    /// slots pinned to other courses of the group.
    ShortDomain {
        lesson: LessonRef,
        required: u32,
        available: usize,
    },
    ClassOverloaded {
        group: GroupId,
        hours: u32,
        open_slots: usize,
    },
    JointHoursMismatch {
        session: String,
        hours: Vec<(LessonRef, u32)>,
    },
    TeacherOverloaded {
        teacher: TeacherId,
        periods: u32,
        slots: usize,
    },
    DailyCapTooTight {
        lesson: LessonRef,
        hours: u32,
        max_weekly: usize,
    },
    ImpossibleDoubleDays {
        lesson: LessonRef,
        rule: DoubleDays,
    },
    ConflictingPins {
        group: GroupId,
        slot: TimeSlot,
        courses: Vec<CourseName>,
    },
    PinnedAndForbidden {
        lesson: LessonRef,
        slot: TimeSlot,
    },
    TooManyPins {
        lesson: LessonRef,
        pinned: usize,
        hours: u32,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ShortDomain {
                lesson,
                required,
                available,
            } => write!(f, "{lesson}: needs {required} slot(s), {available} open"),
            Finding::ClassOverloaded {
                group,
                hours,
                open_slots,
            } => write!(f, "class {group}: {hours} hour(s) in {open_slots} open slot(s)"),
            Finding::JointHoursMismatch { session, hours } => {
                write!(f, "joint session {session}: member hours differ (")?;
                for (i, (lesson, h)) in hours.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{lesson}={h}")?;
                }
                f.write_str(")")
            }
            Finding::TeacherOverloaded {
                teacher,
                periods,
                slots,
            } => write!(f, "teacher {teacher}: {periods} period(s) in a {slots}-slot week"),
            Finding::DailyCapTooTight {
                lesson,
                hours,
                max_weekly,
            } => write!(
                f,
                "{lesson}: {hours} hour(s) but daily caps allow at most {max_weekly}"
            ),
            Finding::ImpossibleDoubleDays { lesson, rule } => {
                write!(f, "{lesson}: double-day rule {rule:?} cannot be met")
            }
            Finding::ConflictingPins {
                group,
                slot,
                courses,
            } => {
                write!(f, "class {group}: {slot} pinned to")?;
                for c in courses {
                    write!(f, " {c}")?;
                }
                Ok(())
            }
            Finding::PinnedAndForbidden { lesson, slot } => {
                write!(f, "{lesson}: {slot} is both mandatory and forbidden")
            }
            Finding::TooManyPins {
                lesson,
                pinned,
                hours,
            } => write!(f, "{lesson}: {pinned} mandatory slot(s) for {hours} hour(s)"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeasibilityReport {
    pub findings: Vec<Finding>,
}

impl FeasibilityReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Necessary-condition checks on the resolved roster. Never fails; an empty
/// report does not prove feasibility.
pub fn precheck(catalog: &Catalog) -> FeasibilityReport {
    let mut findings = Vec::new();
    pins(catalog, &mut findings);
    domains(catalog, &mut findings);
    daily(catalog, &mut findings);
    joint(catalog, &mut findings);
    teachers(catalog, &mut findings);
    FeasibilityReport { findings }
}

fn pins(catalog: &Catalog, out: &mut Vec<Finding>) {
    for group in &catalog.groups {
        let mut by_slot: BTreeMap<SlotIx, Vec<LessonIx>> = BTreeMap::new();
        for &l in &group.lessons {
            for &s in &catalog.lesson(l).mandatory {
                let at = by_slot.entry(s).or_default();
                if !at.contains(&l) {
                    at.push(l);
                }
            }
        }
        for (s, lessons) in by_slot {
            if lessons.len() > 1 {
                out.push(Finding::ConflictingPins {
                    group: group.name.clone(),
                    slot: catalog.slot(s),
                    courses: lessons
                        .iter()
                        .map(|&l| catalog.courses[catalog.lesson(l).course.index()].clone())
                        .collect(),
                });
            }
        }
    }
    for l in catalog.lesson_ids() {
        let lesson = catalog.lesson(l);
        for s in &lesson.mandatory {
            if lesson.forbidden.contains(s) {
                out.push(Finding::PinnedAndForbidden {
                    lesson: catalog.lesson_ref(l),
                    slot: catalog.slot(*s),
                });
            }
        }
        let mut pinned = lesson.mandatory.clone();
        pinned.sort();
        pinned.dedup();
        if pinned.len() > lesson.hours as usize {
            out.push(Finding::TooManyPins {
                lesson: catalog.lesson_ref(l),
                pinned: pinned.len(),
                hours: lesson.hours,
            });
        }
    }
}

fn domains(catalog: &Catalog, out: &mut Vec<Finding>) {
    for group in &catalog.groups {
        let open = group.excluded.iter().filter(|&&e| !e).count();
        let hours: u32 = group.lessons.iter().map(|&l| catalog.lesson(l).hours).sum();
        if hours as usize > open {
            out.push(Finding::ClassOverloaded {
                group: group.name.clone(),
                hours,
                open_slots: open,
            });
        }
        for &l in &group.lessons {
            let lesson = catalog.lesson(l);
            let available = catalog
                .slot_ids()
                .filter(|&s| {
                    !group.excluded[s.index()]
                        && !lesson.forbidden.contains(&s)
                        && !group
                            .lessons
                            .iter()
                            .any(|&o| o != l && catalog.lesson(o).mandatory.contains(&s))
                })
                .count();
            if available < lesson.hours as usize {
                out.push(Finding::ShortDomain {
                    lesson: catalog.lesson_ref(l),
                    required: lesson.hours,
                    available,
                });
            }
        }
    }
}

fn daily(catalog: &Catalog, out: &mut Vec<Finding>) {
    for l in catalog.lesson_ids() {
        let lesson = catalog.lesson(l);
        let group = &catalog.groups[lesson.group.index()];
        let cap = lesson.daily_cap as usize;
        let per_day: Vec<usize> = (0..catalog.days())
            .map(|day| {
                catalog
                    .day_range(day)
                    .filter(|&s| !group.excluded[s])
                    .count()
                    .min(cap)
            })
            .collect();
        let doubles_possible = per_day.iter().filter(|&&n| n >= 2).count();
        let singles: usize = per_day.iter().map(|&n| n.min(1)).sum();
        let impossible = match lesson.double_days {
            DoubleDays::ExactlyOne => doubles_possible == 0 || lesson.hours < 2,
            _ => false,
        };
        if impossible {
            out.push(Finding::ImpossibleDoubleDays {
                lesson: catalog.lesson_ref(l),
                rule: lesson.double_days,
            });
            continue;
        }
        let max_weekly = match lesson.double_days {
            DoubleDays::Unrestricted => per_day.iter().sum(),
            DoubleDays::AtMostOne | DoubleDays::ExactlyOne => {
                singles + usize::from(doubles_possible > 0)
            }
        };
        if (lesson.hours as usize) > max_weekly {
            out.push(Finding::DailyCapTooTight {
                lesson: catalog.lesson_ref(l),
                hours: lesson.hours,
                max_weekly,
            });
        }
    }
}

fn joint(catalog: &Catalog, out: &mut Vec<Finding>) {
    for session in &catalog.joint {
        let hours: Vec<(LessonRef, u32)> = session
            .members
            .iter()
            .map(|&m| (catalog.lesson_ref(m), catalog.lesson(m).hours))
            .collect();
        if hours.iter().any(|(_, h)| *h != hours[0].1) {
            out.push(Finding::JointHoursMismatch {
                session: session.name.clone(),
                hours,
            });
        }
    }
}

fn teachers(catalog: &Catalog, out: &mut Vec<Finding>) {
    for (t, units) in catalog.teacher_units.iter().enumerate() {
        let periods: u32 = units
            .iter()
            .map(|unit| unit.iter().map(|&l| catalog.lesson(l).hours).max().unwrap_or(0))
            .sum();
        if periods as usize > catalog.slot_count() {
            out.push(Finding::TeacherOverloaded {
                teacher: catalog.teachers[t].clone(),
                periods,
                slots: catalog.slot_count(),
            });
        }
    }
}
