use std::collections::BTreeSet;

use types::ScheduledLesson;

use crate::catalog::{Catalog, LessonIx, SlotIx};
use crate::error::StructuralError;
use crate::space::VarSpace;

/// The set of (lesson, slot) cells set to 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    cells: BTreeSet<(LessonIx, SlotIx)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads decision columns from a solver value vector.
    pub fn from_values(space: &VarSpace, values: &[f64]) -> Self {
        let cells = space
            .iter()
            .filter(|(v, _, _)| values.get(v.index()).copied().unwrap_or(0.0) > 0.5)
            .map(|(_, l, s)| (l, s))
            .collect();
        Self { cells }
    }

    pub fn from_timetable(
        catalog: &Catalog,
        entries: &[ScheduledLesson],
    ) -> Result<Self, StructuralError> {
        let mut out = Self::new();
        for e in entries {
            let lesson = types::LessonRef {
                group: e.group.clone(),
                course: e.course.clone(),
            };
            let g = catalog
                .group_ix(&e.group)
                .ok_or_else(|| StructuralError::UnknownGroup {
                    context: "timetable".to_string(),
                    group: e.group.clone(),
                })?;
            let l = catalog
                .lesson_named(g, &e.course)
                .ok_or(StructuralError::UnknownLesson {
                    context: "timetable".to_string(),
                    lesson,
                })?;
            let s = catalog
                .slot_ix(e.slot)
                .ok_or_else(|| StructuralError::SlotOutsideGrid {
                    group: e.group.clone(),
                    slot: e.slot,
                })?;
            out.insert(l, s);
        }
        Ok(out)
    }

    pub fn insert(&mut self, lesson: LessonIx, slot: SlotIx) -> bool {
        self.cells.insert((lesson, slot))
    }

    pub fn contains(&self, lesson: LessonIx, slot: SlotIx) -> bool {
        self.cells.contains(&(lesson, slot))
    }

    pub fn slots_of(&self, lesson: LessonIx) -> impl Iterator<Item = SlotIx> + '_ {
        self.cells
            .range((lesson, SlotIx(0))..=(lesson, SlotIx(u32::MAX)))
            .map(|&(_, s)| s)
    }

    pub fn count(&self, lesson: LessonIx) -> usize {
        self.slots_of(lesson).count()
    }

    /// Slots of `lesson` on one day.
    pub fn count_on_day(&self, catalog: &Catalog, lesson: LessonIx, day: usize) -> usize {
        let range = catalog.day_range(day);
        self.slots_of(lesson)
            .filter(|s| range.contains(&s.index()))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LessonIx, SlotIx)> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Timetable entries sorted by group, slot, then course.
    pub fn to_timetable(&self, catalog: &Catalog) -> Vec<ScheduledLesson> {
        let mut out: Vec<ScheduledLesson> = self
            .cells
            .iter()
            .map(|&(l, s)| {
                let lesson = catalog.lesson_ref(l);
                ScheduledLesson {
                    group: lesson.group,
                    course: lesson.course,
                    teachers: catalog.lesson(l).teacher_names.clone(),
                    slot: catalog.slot(s),
                }
            })
            .collect();
        out.sort_by(|a, b| {
            (&a.group, a.slot, &a.course).cmp(&(&b.group, b.slot, &b.course))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassGroup, CourseRequirement, Roster, TeacherId, TimeSlot};

    fn catalog() -> Catalog {
        let r = Roster::new(vec![
            ClassGroup::new("9-B", vec![CourseRequirement::new("Art", 2, &["Shiwen", "Ms. Wu"])]),
            ClassGroup::new("9-A", vec![CourseRequirement::new("Art", 2, &["Shiwen"])]),
        ]);
        Catalog::build(&r).unwrap()
    }

    #[test]
    fn timetable_round_trip_is_sorted() {
        let cat = catalog();
        let mut a = Assignment::new();
        let art_b = LessonIx(0);
        let art_a = LessonIx(1);
        a.insert(art_b, cat.slot_ix(TimeSlot::new(2, 1)).unwrap());
        a.insert(art_a, cat.slot_ix(TimeSlot::new(3, 4)).unwrap());
        a.insert(art_a, cat.slot_ix(TimeSlot::new(0, 2)).unwrap());

        let table = a.to_timetable(&cat);
        let order: Vec<(String, TimeSlot)> = table
            .iter()
            .map(|e| (e.group.0.clone(), e.slot))
            .collect();
        assert_eq!(
            order,
            vec![
                ("9-A".to_string(), TimeSlot::new(0, 2)),
                ("9-A".to_string(), TimeSlot::new(3, 4)),
                ("9-B".to_string(), TimeSlot::new(2, 1)),
            ]
        );
        assert_eq!(
            table[2].teachers,
            vec![TeacherId::from("Shiwen"), TeacherId::from("Ms. Wu")]
        );
        assert_eq!(Assignment::from_timetable(&cat, &table).unwrap(), a);
        assert_eq!(a.count(art_a), 2);
        assert_eq!(a.count_on_day(&cat, art_a, 3), 1);
    }

    #[test]
    fn unknown_timetable_entry_is_rejected() {
        let cat = catalog();
        let entry = ScheduledLesson {
            group: "9-A".into(),
            course: "Music".into(),
            teachers: vec![],
            slot: TimeSlot::new(0, 1),
        };
        assert!(matches!(
            Assignment::from_timetable(&cat, &[entry]),
            Err(StructuralError::UnknownLesson { .. })
        ));
    }
}
