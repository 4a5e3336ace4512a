//! Independent re-check of every hard rule against a finished assignment.
//!
//! Works from the catalog alone; nothing here looks at model rows or solver
//! columns.

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;
use types::{CourseName, DayOfWeek, DoubleDays, GroupId, LessonRef, TeacherId, TimeSlot};

use crate::assignment::Assignment;
use crate::catalog::{Catalog, GroupIx, LessonIx, RuleKind, SlotIx};
use crate::model::Category;

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn day_name(day: &u8) -> String {
    DayOfWeek::from_index(*day)
        .map(|d| d.short_name().to_string())
        .unwrap_or_else(|| format!("D{day}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum Defect {
    #[error("{lesson} scheduled {actual} time(s), requires {expected}")]
    LoadMismatch {
        lesson: LessonRef,
        expected: u32,
        actual: usize,
    },
    #[error("class {group} double-booked at {slot}: {}", join(.courses))]
    ClassDoubleBooked {
        group: GroupId,
        slot: TimeSlot,
        courses: Vec<CourseName>,
    },
    #[error("{lesson} scheduled in excluded slot {slot}")]
    ExcludedSlotUsed { lesson: LessonRef, slot: TimeSlot },
    #[error("joint session {session} desynchronized at {slot}: present {}, absent {}", join(.present), join(.absent))]
    JointSessionDesynchronized {
        session: String,
        slot: TimeSlot,
        present: Vec<LessonRef>,
        absent: Vec<LessonRef>,
    },
    #[error("teacher {teacher} double-booked at {slot}: {}", join(.lessons))]
    TeacherDoubleBooked {
        teacher: TeacherId,
        slot: TimeSlot,
        lessons: Vec<LessonRef>,
    },
    #[error("rule {rule}: antecedent without consequent at {slot}")]
    ImplicationViolated { rule: String, slot: TimeSlot },
    #[error("rule {rule}: lessons out of sync at {slot}")]
    SyncViolated { rule: String, slot: TimeSlot },
    #[error("rule {rule}: {actual} overlapping slot(s), requires {expected}")]
    OverlapCountMismatch {
        rule: String,
        expected: u32,
        actual: usize,
    },
    #[error("rule {rule}: trigger at {slot} without any required partner")]
    RequirementUnmet { rule: String, slot: TimeSlot },
    #[error("rule {rule}: {first} and {second} share {slot}")]
    MutualExclusionViolated {
        rule: String,
        slot: TimeSlot,
        first: LessonRef,
        second: LessonRef,
    },
    #[error("{lesson} missing from mandatory slot {slot}")]
    MandatorySlotMissed { lesson: LessonRef, slot: TimeSlot },
    #[error("{lesson} scheduled in forbidden slot {slot}")]
    ForbiddenSlotUsed { lesson: LessonRef, slot: TimeSlot },
    #[error("{lesson} has {count} period(s) on {}, cap {cap}", day_name(.day))]
    DailyCapExceeded {
        lesson: LessonRef,
        day: u8,
        count: usize,
        cap: u32,
    },
    #[error("{lesson} doubled on {} in non-adjacent periods {first_period} and {second_period}", day_name(.day))]
    NonAdjacentDouble {
        lesson: LessonRef,
        day: u8,
        first_period: u8,
        second_period: u8,
    },
    #[error("{lesson} has {actual} double day(s), rule {expected:?}")]
    DoubleDaysMismatch {
        lesson: LessonRef,
        expected: DoubleDays,
        actual: usize,
    },
}

impl Defect {
    pub fn category(&self) -> Category {
        match self {
            Defect::LoadMismatch { .. } => Category::Load,
            Defect::ClassDoubleBooked { .. } | Defect::ExcludedSlotUsed { .. } => {
                Category::SlotExclusivity
            }
            Defect::JointSessionDesynchronized { .. } => Category::JointSync,
            Defect::TeacherDoubleBooked { .. } => Category::TeacherNonOverlap,
            Defect::ImplicationViolated { .. } => Category::Implication,
            Defect::SyncViolated { .. } => Category::Sync,
            Defect::OverlapCountMismatch { .. } => Category::OverlapCardinality,
            Defect::RequirementUnmet { .. } => Category::RequiresAny,
            Defect::MutualExclusionViolated { .. } => Category::MutualExclusion,
            Defect::MandatorySlotMissed { .. } | Defect::ForbiddenSlotUsed { .. } => {
                Category::PinnedSlot
            }
            Defect::DailyCapExceeded { .. } => Category::DailyCap,
            Defect::NonAdjacentDouble { .. } => Category::SameDayAdjacency,
            Defect::DoubleDaysMismatch { .. } => Category::DoubleDays,
        }
    }
}

/// Checks every hard rule. Pure: the same inputs give the same list in the
/// same order.
pub fn validate(catalog: &Catalog, assignment: &Assignment) -> Vec<Defect> {
    let mut out = Vec::new();
    check_load(catalog, assignment, &mut out);
    check_class_slots(catalog, assignment, &mut out);
    check_joint(catalog, assignment, &mut out);
    check_teachers(catalog, assignment, &mut out);
    check_rules(catalog, assignment, &mut out);
    check_pins(catalog, assignment, &mut out);
    check_daily(catalog, assignment, &mut out);
    out
}

fn check_load(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for l in catalog.lesson_ids() {
        let expected = catalog.lesson(l).hours;
        let actual = a.count(l);
        if actual != expected as usize {
            out.push(Defect::LoadMismatch {
                lesson: catalog.lesson_ref(l),
                expected,
                actual,
            });
        }
    }
}

fn check_class_slots(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for (g, group) in catalog.groups.iter().enumerate() {
        let g = GroupIx(g as u32);
        for s in catalog.slot_ids() {
            let present: Vec<LessonIx> = group
                .lessons
                .iter()
                .copied()
                .filter(|&l| a.contains(l, s))
                .collect();
            if present.len() > 1 {
                out.push(Defect::ClassDoubleBooked {
                    group: group.name.clone(),
                    slot: catalog.slot(s),
                    courses: present
                        .iter()
                        .map(|&l| catalog.courses[catalog.lesson(l).course.index()].clone())
                        .collect(),
                });
            }
            if catalog.is_excluded(g, s) {
                for l in present {
                    out.push(Defect::ExcludedSlotUsed {
                        lesson: catalog.lesson_ref(l),
                        slot: catalog.slot(s),
                    });
                }
            }
        }
    }
}

fn check_joint(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for session in &catalog.joint {
        for s in catalog.slot_ids() {
            let (present, absent): (Vec<LessonIx>, Vec<LessonIx>) =
                session.members.iter().partition(|&&m| a.contains(m, s));
            if !present.is_empty() && !absent.is_empty() {
                out.push(Defect::JointSessionDesynchronized {
                    session: session.name.clone(),
                    slot: catalog.slot(s),
                    present: present.iter().map(|&l| catalog.lesson_ref(l)).collect(),
                    absent: absent.iter().map(|&l| catalog.lesson_ref(l)).collect(),
                });
            }
        }
    }
}

fn check_teachers(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for (t, lessons) in catalog.teacher_lessons.iter().enumerate() {
        for s in catalog.slot_ids() {
            let busy: Vec<LessonIx> = lessons.iter().copied().filter(|&l| a.contains(l, s)).collect();
            let units: BTreeSet<LessonIx> =
                busy.iter().map(|&l| catalog.component[l.index()]).collect();
            if units.len() > 1 {
                out.push(Defect::TeacherDoubleBooked {
                    teacher: catalog.teachers[t].clone(),
                    slot: catalog.slot(s),
                    lessons: busy.iter().map(|&l| catalog.lesson_ref(l)).collect(),
                });
            }
        }
    }
}

fn check_rules(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for rule in &catalog.rules {
        match &rule.kind {
            RuleKind::Implication {
                antecedent,
                consequent,
            } => {
                for s in catalog.slot_ids() {
                    if a.contains(*antecedent, s) && !a.contains(*consequent, s) {
                        out.push(Defect::ImplicationViolated {
                            rule: rule.name.clone(),
                            slot: catalog.slot(s),
                        });
                    }
                }
            }
            RuleKind::Sync { left, right } => {
                for s in catalog.slot_ids() {
                    if a.contains(*left, s) != a.contains(*right, s) {
                        out.push(Defect::SyncViolated {
                            rule: rule.name.clone(),
                            slot: catalog.slot(s),
                        });
                    }
                }
            }
            RuleKind::OverlapCount {
                series,
                overlapping,
                count,
            } => {
                let actual = a
                    .slots_of(*series)
                    .filter(|&s| overlapping.iter().any(|&o| a.contains(o, s)))
                    .count();
                if actual != *count as usize {
                    out.push(Defect::OverlapCountMismatch {
                        rule: rule.name.clone(),
                        expected: *count,
                        actual,
                    });
                }
            }
            RuleKind::RequiresAny { trigger, any_of } => {
                for s in a.slots_of(*trigger) {
                    if !any_of.iter().any(|&o| a.contains(o, s)) {
                        out.push(Defect::RequirementUnmet {
                            rule: rule.name.clone(),
                            slot: catalog.slot(s),
                        });
                    }
                }
            }
            RuleKind::MutualExclusion { first, second } => {
                for (_, left) in first {
                    for (_, right) in second {
                        for s in catalog.slot_ids() {
                            let hit = |side: &[LessonIx]| side.iter().copied().find(|&l| a.contains(l, s));
                            if let (Some(x), Some(y)) = (hit(left.as_slice()), hit(right.as_slice())) {
                                out.push(Defect::MutualExclusionViolated {
                                    rule: rule.name.clone(),
                                    slot: catalog.slot(s),
                                    first: catalog.lesson_ref(x),
                                    second: catalog.lesson_ref(y),
                                });
                            }
                        }
                    }
                }
            }
        }
    }
}

fn check_pins(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for l in catalog.lesson_ids() {
        let lesson = catalog.lesson(l);
        for &s in &lesson.mandatory {
            if !a.contains(l, s) {
                out.push(Defect::MandatorySlotMissed {
                    lesson: catalog.lesson_ref(l),
                    slot: catalog.slot(s),
                });
            }
        }
        for &s in &lesson.forbidden {
            if a.contains(l, s) {
                out.push(Defect::ForbiddenSlotUsed {
                    lesson: catalog.lesson_ref(l),
                    slot: catalog.slot(s),
                });
            }
        }
    }
}

fn check_daily(catalog: &Catalog, a: &Assignment, out: &mut Vec<Defect>) {
    for l in catalog.lesson_ids() {
        let lesson = catalog.lesson(l);
        let mut double_days = 0usize;
        for day in 0..catalog.days() {
            let range = catalog.day_range(day);
            let slots: Vec<SlotIx> = a.slots_of(l).filter(|s| range.contains(&s.index())).collect();
            if slots.len() > lesson.daily_cap as usize {
                out.push(Defect::DailyCapExceeded {
                    lesson: catalog.lesson_ref(l),
                    day: day as u8,
                    count: slots.len(),
                    cap: lesson.daily_cap,
                });
            }
            if let [p, q] = slots.as_slice() {
                double_days += 1;
                let (p, q) = (catalog.slot(*p).period, catalog.slot(*q).period);
                if lesson.daily_cap >= 2 && q != p + 1 {
                    out.push(Defect::NonAdjacentDouble {
                        lesson: catalog.lesson_ref(l),
                        day: day as u8,
                        first_period: p,
                        second_period: q,
                    });
                }
            }
        }
        let ok = match lesson.double_days {
            DoubleDays::Unrestricted => true,
            DoubleDays::AtMostOne => double_days <= 1,
            DoubleDays::ExactlyOne => double_days == 1,
        };
        if !ok {
            out.push(Defect::DoubleDaysMismatch {
                lesson: catalog.lesson_ref(l),
                expected: lesson.double_days,
                actual: double_days,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::{ClassGroup, CourseRequirement, JointSession, Roster, Rule, Scope, SlotPin, WeekGrid};

    fn roster() -> Roster {
        let mut a = ClassGroup::new(
            "10-A",
            vec![
                CourseRequirement::new("Psych&Geo", 2, &["Ana"]),
                CourseRequirement::new("Phys&Bio", 1, &["Bo"]),
            ],
        );
        a.mandatory = vec![SlotPin {
            course: "Phys&Bio".into(),
            slot: TimeSlot::new(1, 1),
        }];
        let b = ClassGroup::new(
            "10-EAL-A",
            vec![
                CourseRequirement::new("EAL", 2, &["Ana"]),
                CourseRequirement::new("Study", 1, &["Cy"]),
            ],
        );
        let mut r = Roster::new(vec![a, b]);
        r.grid = WeekGrid {
            periods_per_day: vec![3, 3],
        };
        r.rules.push(Rule::Implication {
            name: "e3".into(),
            antecedent: LessonRef::new("10-A", "Psych&Geo"),
            consequent: LessonRef::new("10-EAL-A", "EAL"),
        });
        r
    }

    fn put(cat: &Catalog, a: &mut Assignment, group: &str, course: &str, day: u8, period: u8) {
        let l = cat.find_lesson(&LessonRef::new(group, course)).unwrap();
        a.insert(l, cat.slot_ix(TimeSlot::new(day, period)).unwrap());
    }

    #[test]
    fn clean_assignment_has_no_defects() {
        let mut r = roster();
        // Ana teaches both, so they have to run as one session
        r.joint_sessions.push(JointSession {
            name: "ana".into(),
            members: vec![
                LessonRef::new("10-A", "Psych&Geo"),
                LessonRef::new("10-EAL-A", "EAL"),
            ],
        });
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 1, 2);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 2);
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 3);
        assert_eq!(validate(&cat, &a), vec![]);
    }

    #[test]
    fn consequent_alone_is_not_a_defect() {
        let cat = Catalog::build(&roster()).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 2);
        let defects = validate(&cat, &a);
        assert!(defects.iter().all(|d| d.category() != Category::Implication));
    }

    #[test]
    fn reports_named_defects() {
        let cat = Catalog::build(&roster()).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 3);
        put(&cat, &mut a, "10-A", "Phys&Bio", 0, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 3);
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 2);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 1);

        let defects = validate(&cat, &a);
        let categories: Vec<Category> = defects.iter().map(Defect::category).collect();
        assert_eq!(
            categories,
            vec![
                Category::SlotExclusivity,
                Category::TeacherNonOverlap,
                Category::Implication,
                Category::PinnedSlot,
                Category::DailyCap,
            ]
        );
        assert_eq!(
            defects[1],
            Defect::TeacherDoubleBooked {
                teacher: "Ana".into(),
                slot: TimeSlot::new(0, 3),
                lessons: vec![
                    LessonRef::new("10-A", "Psych&Geo"),
                    LessonRef::new("10-EAL-A", "EAL"),
                ],
            }
        );
        assert_eq!(
            defects[2].to_string(),
            "rule e3: antecedent without consequent at Mon-1"
        );
    }

    #[test]
    fn non_adjacent_double_only_on_two_period_days() {
        let mut r = roster();
        r.classes[0].courses[0].double_period = true;
        r.classes[0].mandatory.clear();
        r.rules.clear();
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 3);
        let defects: Vec<Defect> = validate(&cat, &a)
            .into_iter()
            .filter(|d| d.category() == Category::SameDayAdjacency)
            .collect();
        assert_eq!(
            defects,
            vec![Defect::NonAdjacentDouble {
                lesson: LessonRef::new("10-A", "Psych&Geo"),
                day: 0,
                first_period: 1,
                second_period: 3,
            }]
        );
        assert_eq!(
            defects[0].to_string(),
            "10-A/Psych&Geo doubled on Mon in non-adjacent periods 1 and 3"
        );
    }

    #[test]
    fn exclusion_and_double_days() {
        let mut r = roster();
        r.rules = vec![Rule::MutualExclusion {
            name: "m".into(),
            first: vec![Scope::lesson("10-A", "Phys&Bio")],
            second: vec![Scope::group("10-EAL-A")],
        }];
        r.classes[1].courses[0].double_days = DoubleDays::ExactlyOne;
        r.classes[1].courses[0].double_period = true;
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 2);
        let defects = validate(&cat, &a);
        assert!(defects.contains(&Defect::MutualExclusionViolated {
            rule: "m".into(),
            slot: TimeSlot::new(1, 1),
            first: LessonRef::new("10-A", "Phys&Bio"),
            second: LessonRef::new("10-EAL-A", "Study"),
        }));
        assert!(defects.contains(&Defect::DoubleDaysMismatch {
            lesson: LessonRef::new("10-EAL-A", "EAL"),
            expected: DoubleDays::ExactlyOne,
            actual: 0,
        }));
    }

    fn only(defects: Vec<Defect>, category: Category) -> Vec<Defect> {
        defects.into_iter().filter(|d| d.category() == category).collect()
    }

    #[test]
    fn load_counts_missing_and_extra_periods() {
        let cat = Catalog::build(&roster()).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 2);
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 3);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 2);
        let defects = only(validate(&cat, &a), Category::Load);
        assert_eq!(
            defects,
            vec![
                Defect::LoadMismatch {
                    lesson: LessonRef::new("10-A", "Phys&Bio"),
                    expected: 1,
                    actual: 2,
                },
                Defect::LoadMismatch {
                    lesson: LessonRef::new("10-EAL-A", "Study"),
                    expected: 1,
                    actual: 0,
                },
            ]
        );
        assert_eq!(
            defects[1].to_string(),
            "10-EAL-A/Study scheduled 0 time(s), requires 1"
        );
    }

    #[test]
    fn excluded_slot_is_reported_per_lesson() {
        let mut r = roster();
        r.classes[1].excluded = vec![TimeSlot::new(1, 3)];
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 3);
        put(&cat, &mut a, "10-A", "Psych&Geo", 1, 3);
        let defects = only(validate(&cat, &a), Category::SlotExclusivity);
        assert_eq!(
            defects,
            vec![Defect::ExcludedSlotUsed {
                lesson: LessonRef::new("10-EAL-A", "Study"),
                slot: TimeSlot::new(1, 3),
            }]
        );
    }

    #[test]
    fn joint_members_apart_are_desynchronized() {
        let mut r = roster();
        r.rules.clear();
        r.joint_sessions.push(JointSession {
            name: "ana".into(),
            members: vec![
                LessonRef::new("10-A", "Psych&Geo"),
                LessonRef::new("10-EAL-A", "EAL"),
            ],
        });
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 1, 2);
        put(&cat, &mut a, "10-EAL-A", "EAL", 0, 2);
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 2);
        let defects = only(validate(&cat, &a), Category::JointSync);
        assert_eq!(
            defects,
            vec![
                Defect::JointSessionDesynchronized {
                    session: "ana".into(),
                    slot: TimeSlot::new(0, 1),
                    present: vec![LessonRef::new("10-A", "Psych&Geo")],
                    absent: vec![LessonRef::new("10-EAL-A", "EAL")],
                },
                Defect::JointSessionDesynchronized {
                    session: "ana".into(),
                    slot: TimeSlot::new(0, 2),
                    present: vec![LessonRef::new("10-EAL-A", "EAL")],
                    absent: vec![LessonRef::new("10-A", "Psych&Geo")],
                },
            ]
        );
    }

    #[test]
    fn sync_flags_each_unmatched_slot() {
        let mut r = roster();
        r.rules = vec![Rule::Sync {
            name: "pb-study".into(),
            left: LessonRef::new("10-A", "Phys&Bio"),
            right: LessonRef::new("10-EAL-A", "Study"),
        }];
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 2);
        assert_eq!(
            only(validate(&cat, &a), Category::Sync),
            vec![
                Defect::SyncViolated {
                    rule: "pb-study".into(),
                    slot: TimeSlot::new(1, 1),
                },
                Defect::SyncViolated {
                    rule: "pb-study".into(),
                    slot: TimeSlot::new(1, 2),
                },
            ]
        );

        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 1);
        assert!(only(validate(&cat, &a), Category::Sync).is_empty());
    }

    #[test]
    fn overlap_count_compares_shared_slots() {
        let mut r = roster();
        r.rules = vec![Rule::OverlapCount {
            name: "pg-study".into(),
            series: LessonRef::new("10-A", "Psych&Geo"),
            overlapping: vec![LessonRef::new("10-EAL-A", "Study")],
            count: 1,
        }];
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 1, 2);
        put(&cat, &mut a, "10-EAL-A", "Study", 0, 2);
        let defects = only(validate(&cat, &a), Category::OverlapCardinality);
        assert_eq!(
            defects,
            vec![Defect::OverlapCountMismatch {
                rule: "pg-study".into(),
                expected: 1,
                actual: 0,
            }]
        );
        assert_eq!(
            defects[0].to_string(),
            "rule pg-study: 0 overlapping slot(s), requires 1"
        );

        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Psych&Geo", 0, 1);
        put(&cat, &mut a, "10-A", "Psych&Geo", 1, 2);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 2);
        assert!(only(validate(&cat, &a), Category::OverlapCardinality).is_empty());
    }

    #[test]
    fn requires_any_needs_one_partner_per_trigger_slot() {
        let mut r = roster();
        r.rules = vec![Rule::RequiresAny {
            name: "cover".into(),
            trigger: LessonRef::new("10-A", "Phys&Bio"),
            any_of: vec![
                LessonRef::new("10-EAL-A", "EAL"),
                LessonRef::new("10-EAL-A", "Study"),
            ],
        }];
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 1, 2);
        let defects = only(validate(&cat, &a), Category::RequiresAny);
        assert_eq!(
            defects,
            vec![Defect::RequirementUnmet {
                rule: "cover".into(),
                slot: TimeSlot::new(1, 1),
            }]
        );
        assert_eq!(
            defects[0].to_string(),
            "rule cover: trigger at Tue-1 without any required partner"
        );

        // a partner alone is fine
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "EAL", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 0, 3);
        assert!(only(validate(&cat, &a), Category::RequiresAny).is_empty());
    }

    #[test]
    fn forbidden_pin_is_reported() {
        let mut r = roster();
        r.classes[1].forbidden = vec![SlotPin {
            course: "Study".into(),
            slot: TimeSlot::new(0, 2),
        }];
        let cat = Catalog::build(&r).unwrap();
        let mut a = Assignment::new();
        put(&cat, &mut a, "10-A", "Phys&Bio", 1, 1);
        put(&cat, &mut a, "10-EAL-A", "Study", 0, 2);
        assert_eq!(
            only(validate(&cat, &a), Category::PinnedSlot),
            vec![Defect::ForbiddenSlotUsed {
                lesson: LessonRef::new("10-EAL-A", "Study"),
                slot: TimeSlot::new(0, 2),
            }]
        );
    }

    proptest! {
        #[test]
        fn validation_is_idempotent(cells in proptest::collection::btree_set((0u32..4, 0u32..6), 0..14)) {
            let cat = Catalog::build(&roster()).unwrap();
            let mut a = Assignment::new();
            for (l, s) in cells {
                a.insert(LessonIx(l), SlotIx(s));
            }
            let first = validate(&cat, &a);
            let second = validate(&cat, &a);
            prop_assert_eq!(first, second);
        }
    }
}
