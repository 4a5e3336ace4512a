use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use types::{
    CourseName, DoubleDays, GroupId, GroupKind, LessonRef, Roster, Rule, Scope, TeacherId,
    TeacherLoad, TimeSlot, WeekGrid,
};

use crate::error::StructuralError;

macro_rules! handle {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}
handle!(GroupIx);
handle!(CourseIx);
handle!(TeacherIx);
handle!(LessonIx);
handle!(SlotIx);

#[derive(Clone, Debug)]
pub struct GroupEntry {
    pub name: GroupId,
    pub grade: u8,
    pub kind: GroupKind,
    pub lessons: Vec<LessonIx>,
    pub excluded: Vec<bool>,
}

/// One required (class group, course) pair with its resolved settings.
#[derive(Clone, Debug)]
pub struct LessonEntry {
    pub group: GroupIx,
    pub course: CourseIx,
    pub hours: u32,
    pub teachers: Vec<TeacherIx>,
    /// Teacher labels exactly as listed in the roster.
    pub teacher_names: Vec<TeacherId>,
    pub daily_cap: u32,
    pub double_days: DoubleDays,
    pub mandatory: Vec<SlotIx>,
    pub forbidden: Vec<SlotIx>,
}

#[derive(Clone, Debug)]
pub struct JointEntry {
    pub name: String,
    pub members: Vec<LessonIx>,
}

pub type GroupedLessons = Vec<(GroupIx, Vec<LessonIx>)>;

#[derive(Clone, Debug)]
pub enum RuleKind {
    Implication {
        antecedent: LessonIx,
        consequent: LessonIx,
    },
    Sync {
        left: LessonIx,
        right: LessonIx,
    },
    OverlapCount {
        series: LessonIx,
        overlapping: Vec<LessonIx>,
        count: u32,
    },
    MutualExclusion {
        first: GroupedLessons,
        second: GroupedLessons,
    },
    RequiresAny {
        trigger: LessonIx,
        any_of: Vec<LessonIx>,
    },
}

#[derive(Clone, Debug)]
pub struct RuleEntry {
    pub name: String,
    pub kind: RuleKind,
}

#[derive(Clone, Debug)]
pub struct BundleEntry {
    pub name: String,
    pub groups: GroupedLessons,
    pub min_per_day: u32,
    pub reward: i64,
    pub max_per_day: Option<u32>,
    pub excess_weight: i64,
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedPrefs {
    pub consecutive: Vec<(LessonIx, i64)>,
    pub bundles: Vec<BundleEntry>,
    pub teacher_load: TeacherLoad,
}

/// The roster with every name resolved to a small-integer handle.
///
/// Built once per run and never mutated afterwards; everything downstream
/// (variable space, compiler, validator, scoring) indexes through it.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub grid: WeekGrid,
    pub slots: Vec<TimeSlot>,
    day_start: Vec<usize>,
    pub groups: Vec<GroupEntry>,
    pub courses: Vec<CourseName>,
    pub teachers: Vec<TeacherId>,
    pub lessons: Vec<LessonEntry>,
    pub joint: Vec<JointEntry>,
    pub rules: Vec<RuleEntry>,
    pub prefs: ResolvedPrefs,
    /// Root lesson of the joint-session component each lesson belongs to.
    pub component: Vec<LessonIx>,
    pub teacher_lessons: Vec<Vec<LessonIx>>,
    /// Per teacher, the teacher's lessons grouped by joint-session component.
    pub teacher_units: Vec<Vec<Vec<LessonIx>>>,
    group_by_name: HashMap<String, GroupIx>,
    course_by_name: HashMap<String, CourseIx>,
    teacher_by_name: HashMap<String, TeacherIx>,
    lesson_by_key: HashMap<(GroupIx, CourseIx), LessonIx>,
}

impl Catalog {
    pub fn build(roster: &Roster) -> Result<Self, StructuralError> {
        let grid = roster.grid.clone();
        if grid.days() == 0 || grid.days() > 7 || grid.periods_per_day.iter().any(|&p| p == 0) {
            return Err(StructuralError::InvalidGrid);
        }
        let slots: Vec<TimeSlot> = grid.slots().collect();
        let mut day_start = Vec::with_capacity(grid.days() + 1);
        let mut acc = 0usize;
        for &p in &grid.periods_per_day {
            day_start.push(acc);
            acc += p as usize;
        }
        day_start.push(acc);

        let mut cat = Catalog {
            grid,
            slots,
            day_start,
            groups: Vec::new(),
            courses: Vec::new(),
            teachers: Vec::new(),
            lessons: Vec::new(),
            joint: Vec::new(),
            rules: Vec::new(),
            prefs: ResolvedPrefs::default(),
            component: Vec::new(),
            teacher_lessons: Vec::new(),
            teacher_units: Vec::new(),
            group_by_name: HashMap::new(),
            course_by_name: HashMap::new(),
            teacher_by_name: HashMap::new(),
            lesson_by_key: HashMap::new(),
        };

        for class in &roster.classes {
            cat.add_group(class)?;
        }
        cat.index_teachers();
        for session in &roster.joint_sessions {
            let context = format!("joint session {}", session.name);
            if session.members.len() < 2 {
                return Err(StructuralError::TooFewMembers { context, min: 2 });
            }
            let members = session
                .members
                .iter()
                .map(|m| cat.resolve(&context, m))
                .collect::<Result<Vec<_>, _>>()?;
            cat.joint.push(JointEntry {
                name: session.name.clone(),
                members,
            });
        }
        cat.link_components();
        for rule in &roster.rules {
            let kind = cat.resolve_rule(rule)?;
            cat.rules.push(RuleEntry {
                name: rule.name().to_string(),
                kind,
            });
        }
        cat.prefs = cat.resolve_prefs(roster)?;
        Ok(cat)
    }

    fn add_group(&mut self, class: &types::ClassGroup) -> Result<(), StructuralError> {
        if self.group_by_name.contains_key(class.name.as_str()) {
            return Err(StructuralError::DuplicateGroup(class.name.clone()));
        }
        let gix = GroupIx(self.groups.len() as u32);
        let mut excluded = vec![false; self.slots.len()];
        for &slot in &class.excluded {
            let s = self
                .grid
                .index_of(slot)
                .ok_or_else(|| StructuralError::SlotOutsideGrid {
                    group: class.name.clone(),
                    slot,
                })?;
            excluded[s] = true;
        }
        self.group_by_name.insert(class.name.0.clone(), gix);

        let mut lessons = Vec::with_capacity(class.courses.len());
        for req in &class.courses {
            let lesson = LessonRef {
                group: class.name.clone(),
                course: req.course.clone(),
            };
            let cix = self.intern_course(&req.course);
            if self.lesson_by_key.contains_key(&(gix, cix)) {
                return Err(StructuralError::DuplicateCourse {
                    group: class.name.clone(),
                    course: req.course.clone(),
                });
            }
            if req.hours == 0 {
                return Err(StructuralError::ZeroHours { lesson });
            }
            if req.teachers.is_empty() {
                return Err(StructuralError::MissingTeacher { lesson });
            }
            let cap = req.daily_cap();
            if !(1..=2).contains(&cap) {
                return Err(StructuralError::InvalidDailyCap { lesson, cap });
            }
            let mut teachers: Vec<TeacherIx> = Vec::with_capacity(req.teachers.len());
            for t in &req.teachers {
                let tix = self.intern_teacher(t);
                if !teachers.contains(&tix) {
                    teachers.push(tix);
                }
            }
            let lix = LessonIx(self.lessons.len() as u32);
            self.lesson_by_key.insert((gix, cix), lix);
            self.lessons.push(LessonEntry {
                group: gix,
                course: cix,
                hours: req.hours,
                teachers,
                teacher_names: req.teachers.clone(),
                daily_cap: cap,
                double_days: req.double_days,
                mandatory: Vec::new(),
                forbidden: Vec::new(),
            });
            lessons.push(lix);
        }
        self.groups.push(GroupEntry {
            name: class.name.clone(),
            grade: class.grade,
            kind: class.kind,
            lessons,
            excluded,
        });

        let context = format!("pinned slots of {}", class.name);
        for pin in &class.mandatory {
            let lesson = LessonRef {
                group: class.name.clone(),
                course: pin.course.clone(),
            };
            let lix = self
                .lesson_named(gix, &pin.course)
                .ok_or_else(|| StructuralError::UnknownLesson {
                    context: context.clone(),
                    lesson: lesson.clone(),
                })?;
            let s = self
                .grid
                .index_of(pin.slot)
                .filter(|&s| !self.groups[gix.index()].excluded[s])
                .ok_or(StructuralError::MandatoryOutsideDomain {
                    lesson,
                    slot: pin.slot,
                })?;
            self.lessons[lix.index()].mandatory.push(SlotIx(s as u32));
        }
        for pin in &class.forbidden {
            let lix = self
                .lesson_named(gix, &pin.course)
                .ok_or_else(|| StructuralError::UnknownLesson {
                    context: context.clone(),
                    lesson: LessonRef {
                        group: class.name.clone(),
                        course: pin.course.clone(),
                    },
                })?;
            let s = self
                .grid
                .index_of(pin.slot)
                .ok_or_else(|| StructuralError::SlotOutsideGrid {
                    group: class.name.clone(),
                    slot: pin.slot,
                })?;
            self.lessons[lix.index()].forbidden.push(SlotIx(s as u32));
        }
        Ok(())
    }

    fn intern_course(&mut self, name: &CourseName) -> CourseIx {
        if let Some(&c) = self.course_by_name.get(name.as_str()) {
            return c;
        }
        let c = CourseIx(self.courses.len() as u32);
        self.courses.push(name.clone());
        self.course_by_name.insert(name.0.clone(), c);
        c
    }

    fn intern_teacher(&mut self, name: &TeacherId) -> TeacherIx {
        if let Some(&t) = self.teacher_by_name.get(name.as_str()) {
            return t;
        }
        let t = TeacherIx(self.teachers.len() as u32);
        self.teachers.push(name.clone());
        self.teacher_by_name.insert(name.0.clone(), t);
        t
    }

    fn index_teachers(&mut self) {
        let mut by_teacher = vec![Vec::new(); self.teachers.len()];
        for (i, lesson) in self.lessons.iter().enumerate() {
            for &t in &lesson.teachers {
                by_teacher[t.index()].push(LessonIx(i as u32));
            }
        }
        self.teacher_lessons = by_teacher;
    }

    fn link_components(&mut self) {
        let mut parent: Vec<u32> = (0..self.lessons.len() as u32).collect();
        for session in &self.joint {
            let first = find(&mut parent, session.members[0].0);
            for m in &session.members[1..] {
                let root = find(&mut parent, m.0);
                if root != first {
                    parent[root as usize] = first;
                }
            }
        }
        self.component = (0..self.lessons.len() as u32)
            .map(|l| LessonIx(find(&mut parent, l)))
            .collect();

        self.teacher_units = self
            .teacher_lessons
            .iter()
            .map(|lessons| {
                let mut units: BTreeMap<LessonIx, Vec<LessonIx>> = BTreeMap::new();
                for &l in lessons {
                    units.entry(self.component[l.index()]).or_default().push(l);
                }
                units.into_values().collect()
            })
            .collect();
    }

    fn resolve(&self, context: &str, r: &LessonRef) -> Result<LessonIx, StructuralError> {
        let g = self.group_ix(&r.group).ok_or_else(|| StructuralError::UnknownGroup {
            context: context.to_string(),
            group: r.group.clone(),
        })?;
        self.lesson_named(g, &r.course)
            .ok_or_else(|| StructuralError::UnknownLesson {
                context: context.to_string(),
                lesson: r.clone(),
            })
    }

    fn resolve_scopes(
        &self,
        context: &str,
        scopes: &[Scope],
    ) -> Result<GroupedLessons, StructuralError> {
        let mut grouped: BTreeMap<GroupIx, Vec<LessonIx>> = BTreeMap::new();
        for scope in scopes {
            let g = self
                .group_ix(&scope.group)
                .ok_or_else(|| StructuralError::UnknownGroup {
                    context: context.to_string(),
                    group: scope.group.clone(),
                })?;
            let lessons = match &scope.course {
                Some(course) => vec![self.resolve(
                    context,
                    &LessonRef {
                        group: scope.group.clone(),
                        course: course.clone(),
                    },
                )?],
                None => self.groups[g.index()].lessons.clone(),
            };
            let entry = grouped.entry(g).or_default();
            for l in lessons {
                if !entry.contains(&l) {
                    entry.push(l);
                }
            }
        }
        Ok(grouped.into_iter().collect())
    }

    fn resolve_rule(&self, rule: &Rule) -> Result<RuleKind, StructuralError> {
        let context = format!("rule {}", rule.name());
        let kind = match rule {
            Rule::Implication {
                antecedent,
                consequent,
                ..
            } => RuleKind::Implication {
                antecedent: self.resolve(&context, antecedent)?,
                consequent: self.resolve(&context, consequent)?,
            },
            Rule::Sync { left, right, .. } => RuleKind::Sync {
                left: self.resolve(&context, left)?,
                right: self.resolve(&context, right)?,
            },
            Rule::OverlapCount {
                series,
                overlapping,
                count,
                ..
            } => {
                if overlapping.is_empty() {
                    return Err(StructuralError::TooFewMembers { context, min: 1 });
                }
                RuleKind::OverlapCount {
                    series: self.resolve(&context, series)?,
                    overlapping: overlapping
                        .iter()
                        .map(|l| self.resolve(&context, l))
                        .collect::<Result<_, _>>()?,
                    count: *count,
                }
            }
            Rule::MutualExclusion { first, second, .. } => {
                if first.is_empty() || second.is_empty() {
                    return Err(StructuralError::TooFewMembers { context, min: 1 });
                }
                let first = self.resolve_scopes(&context, first)?;
                let second = self.resolve_scopes(&context, second)?;
                for (_, lessons) in &first {
                    for l in lessons {
                        if second.iter().any(|(_, other)| other.contains(l)) {
                            return Err(StructuralError::OverlappingSides {
                                context,
                                lesson: self.lesson_ref(*l),
                            });
                        }
                    }
                }
                RuleKind::MutualExclusion { first, second }
            }
            Rule::RequiresAny {
                trigger, any_of, ..
            } => {
                if any_of.is_empty() {
                    return Err(StructuralError::TooFewMembers { context, min: 1 });
                }
                RuleKind::RequiresAny {
                    trigger: self.resolve(&context, trigger)?,
                    any_of: any_of
                        .iter()
                        .map(|l| self.resolve(&context, l))
                        .collect::<Result<_, _>>()?,
                }
            }
        };
        Ok(kind)
    }

    fn resolve_prefs(&self, roster: &Roster) -> Result<ResolvedPrefs, StructuralError> {
        let prefs = &roster.preferences;
        let mut weights: BTreeMap<LessonIx, i64> = BTreeMap::new();
        for category in &prefs.consecutive {
            for course in &category.courses {
                let c = self.course_ix(course).ok_or_else(|| StructuralError::UnknownCourse {
                    context: "consecutive preference".to_string(),
                    course: course.clone(),
                })?;
                for (i, lesson) in self.lessons.iter().enumerate() {
                    if lesson.course == c {
                        *weights.entry(LessonIx(i as u32)).or_default() += category.weight as i64;
                    }
                }
            }
        }

        let load = &prefs.teacher_load;
        if load.weight > 0 {
            return Err(StructuralError::InvalidPreference {
                context: "teacher load".to_string(),
                reason: format!("weight {} must not be positive", load.weight),
            });
        }

        let mut bundles = Vec::with_capacity(prefs.daily_bundle.len());
        for bundle in &prefs.daily_bundle {
            let context = format!("daily bundle {}", bundle.name);
            if bundle.min_per_day == 0 {
                return Err(StructuralError::InvalidPreference {
                    context,
                    reason: "min_per_day must be at least 1".to_string(),
                });
            }
            if bundle.excess_weight > 0 {
                return Err(StructuralError::InvalidPreference {
                    context,
                    reason: format!("excess_weight {} must not be positive", bundle.excess_weight),
                });
            }
            let mut courses = Vec::with_capacity(bundle.courses.len());
            for course in &bundle.courses {
                courses.push(self.course_ix(course).ok_or_else(|| {
                    StructuralError::UnknownCourse {
                        context: context.clone(),
                        course: course.clone(),
                    }
                })?);
            }
            let mut groups = Vec::with_capacity(bundle.groups.len());
            for group in &bundle.groups {
                let g = self
                    .group_ix(group)
                    .ok_or_else(|| StructuralError::UnknownGroup {
                        context: context.clone(),
                        group: group.clone(),
                    })?;
                let lessons = self.groups[g.index()]
                    .lessons
                    .iter()
                    .copied()
                    .filter(|l| courses.contains(&self.lessons[l.index()].course))
                    .collect();
                groups.push((g, lessons));
            }
            bundles.push(BundleEntry {
                name: bundle.name.clone(),
                groups,
                min_per_day: bundle.min_per_day,
                reward: bundle.reward as i64,
                max_per_day: bundle.max_per_day,
                excess_weight: bundle.excess_weight as i64,
            });
        }

        Ok(ResolvedPrefs {
            consecutive: weights.into_iter().filter(|&(_, w)| w != 0).collect(),
            bundles,
            teacher_load: prefs.teacher_load.clone(),
        })
    }

    pub fn group_ix(&self, name: &GroupId) -> Option<GroupIx> {
        self.group_by_name.get(name.as_str()).copied()
    }

    pub fn course_ix(&self, name: &CourseName) -> Option<CourseIx> {
        self.course_by_name.get(name.as_str()).copied()
    }

    pub fn teacher_ix(&self, name: &TeacherId) -> Option<TeacherIx> {
        self.teacher_by_name.get(name.as_str()).copied()
    }

    pub fn lesson_named(&self, group: GroupIx, course: &CourseName) -> Option<LessonIx> {
        let c = self.course_ix(course)?;
        self.lesson_by_key.get(&(group, c)).copied()
    }

    pub fn find_lesson(&self, r: &LessonRef) -> Option<LessonIx> {
        self.lesson_named(self.group_ix(&r.group)?, &r.course)
    }

    pub fn lesson(&self, l: LessonIx) -> &LessonEntry {
        &self.lessons[l.index()]
    }

    pub fn lesson_ids(&self) -> impl Iterator<Item = LessonIx> {
        (0..self.lessons.len() as u32).map(LessonIx)
    }

    pub fn lesson_ref(&self, l: LessonIx) -> LessonRef {
        let lesson = &self.lessons[l.index()];
        LessonRef {
            group: self.groups[lesson.group.index()].name.clone(),
            course: self.courses[lesson.course.index()].clone(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, s: SlotIx) -> TimeSlot {
        self.slots[s.index()]
    }

    pub fn slot_ix(&self, slot: TimeSlot) -> Option<SlotIx> {
        self.grid.index_of(slot).map(|s| SlotIx(s as u32))
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotIx> {
        (0..self.slots.len() as u32).map(SlotIx)
    }

    pub fn days(&self) -> usize {
        self.grid.days()
    }

    /// Slot indices of one day; slots are laid out day-major, so this is contiguous.
    pub fn day_range(&self, day: usize) -> Range<usize> {
        self.day_start[day]..self.day_start[day + 1]
    }

    pub fn first_period(&self, day: usize) -> SlotIx {
        SlotIx(self.day_start[day] as u32)
    }

    pub fn is_excluded(&self, g: GroupIx, s: SlotIx) -> bool {
        self.groups[g.index()].excluded[s.index()]
    }

    pub fn same_unit(&self, a: LessonIx, b: LessonIx) -> bool {
        self.component[a.index()] == self.component[b.index()]
    }
}

fn find(parent: &mut [u32], x: u32) -> u32 {
    let mut root = x;
    while parent[root as usize] != root {
        root = parent[root as usize];
    }
    let mut cur = x;
    while parent[cur as usize] != root {
        let next = parent[cur as usize];
        parent[cur as usize] = root;
        cur = next;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassGroup, CourseRequirement, JointSession, SlotPin};

    fn roster() -> Roster {
        let mut a = ClassGroup::new(
            "11-A",
            vec![
                CourseRequirement::new("Group 1 AP", 5, &["Guo", "Zhao", "Shiwen"]),
                CourseRequirement::new("Art", 2, &["Shiwen"]),
            ],
        );
        a.excluded = vec![TimeSlot::new(1, 7)];
        let b = ClassGroup::new(
            "11-B",
            vec![CourseRequirement::new("Group 1 AP", 5, &["Guo", "Zhao", "Shiwen"])],
        );
        let mut r = Roster::new(vec![a, b]);
        r.joint_sessions.push(JointSession {
            name: "ap1".into(),
            members: vec![
                LessonRef::new("11-A", "Group 1 AP"),
                LessonRef::new("11-B", "Group 1 AP"),
            ],
        });
        r
    }

    #[test]
    fn interns_names_and_links_joint_components() {
        let cat = Catalog::build(&roster()).unwrap();
        assert_eq!(cat.lessons.len(), 3);
        assert_eq!(cat.teachers.len(), 3);
        assert_eq!(cat.courses.len(), 2);

        let a = cat.find_lesson(&LessonRef::new("11-A", "Group 1 AP")).unwrap();
        let b = cat.find_lesson(&LessonRef::new("11-B", "Group 1 AP")).unwrap();
        let art = cat.find_lesson(&LessonRef::new("11-A", "Art")).unwrap();
        assert!(cat.same_unit(a, b));
        assert!(!cat.same_unit(a, art));

        let shiwen = cat.teacher_ix(&"Shiwen".into()).unwrap();
        assert_eq!(cat.teacher_lessons[shiwen.index()].len(), 3);
        // the joint AP pair counts once, Art separately
        assert_eq!(cat.teacher_units[shiwen.index()].len(), 2);
    }

    #[test]
    fn keeps_teacher_order_for_reporting() {
        let cat = Catalog::build(&roster()).unwrap();
        let a = cat.find_lesson(&LessonRef::new("11-A", "Group 1 AP")).unwrap();
        let names: Vec<&str> = cat.lesson(a).teacher_names.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["Guo", "Zhao", "Shiwen"]);
    }

    #[test]
    fn day_ranges_follow_grid() {
        let cat = Catalog::build(&roster()).unwrap();
        assert_eq!(cat.day_range(0), 0..6);
        assert_eq!(cat.day_range(1), 6..14);
        assert_eq!(cat.day_range(4), 28..35);
        assert_eq!(cat.slot(cat.first_period(2)), TimeSlot::new(2, 1));
    }

    #[test]
    fn rejects_joint_session_with_unknown_course() {
        let mut r = roster();
        r.joint_sessions[0].members.push(LessonRef::new("11-B", "Art"));
        let err = Catalog::build(&r).unwrap_err();
        assert!(matches!(err, StructuralError::UnknownLesson { .. }));
    }

    #[test]
    fn rejects_joint_session_with_unknown_group() {
        let mut r = roster();
        r.joint_sessions[0].members.push(LessonRef::new("12-A", "Group 1 AP"));
        let err = Catalog::build(&r).unwrap_err();
        assert!(matches!(err, StructuralError::UnknownGroup { .. }));
    }

    #[test]
    fn rejects_mandatory_slot_on_excluded_cell() {
        let mut r = roster();
        r.classes[0].mandatory.push(SlotPin {
            course: "Art".into(),
            slot: TimeSlot::new(1, 7),
        });
        let err = Catalog::build(&r).unwrap_err();
        assert_eq!(
            err,
            StructuralError::MandatoryOutsideDomain {
                lesson: LessonRef::new("11-A", "Art"),
                slot: TimeSlot::new(1, 7),
            }
        );
    }

    #[test]
    fn rejects_invalid_daily_cap() {
        let mut r = roster();
        r.classes[0].courses[1].max_per_day = Some(3);
        let err = Catalog::build(&r).unwrap_err();
        assert!(matches!(err, StructuralError::InvalidDailyCap { cap: 3, .. }));
    }

    #[test]
    fn rejects_exclusion_with_shared_lesson() {
        let mut r = roster();
        r.rules.push(Rule::MutualExclusion {
            name: "x".into(),
            first: vec![Scope::group("11-A")],
            second: vec![Scope::lesson("11-A", "Art")],
        });
        let err = Catalog::build(&r).unwrap_err();
        assert!(matches!(err, StructuralError::OverlappingSides { .. }));
    }

    #[test]
    fn consecutive_weights_merge_per_lesson() {
        let mut r = roster();
        r.preferences.consecutive = vec![
            types::ConsecutiveWeight {
                courses: vec!["Group 1 AP".into()],
                weight: 3,
            },
            types::ConsecutiveWeight {
                courses: vec!["Group 1 AP".into(), "Art".into()],
                weight: -3,
            },
        ];
        let cat = Catalog::build(&r).unwrap();
        let art = cat.find_lesson(&LessonRef::new("11-A", "Art")).unwrap();
        assert_eq!(cat.prefs.consecutive, vec![(art, -3)]);
    }

    #[test]
    fn positive_load_weight_is_rejected() {
        let mut r = roster();
        r.preferences.teacher_load.weight = 2;
        assert!(matches!(
            Catalog::build(&r),
            Err(StructuralError::InvalidPreference { .. })
        ));
    }

    #[test]
    fn unknown_preference_course_is_structural() {
        let mut r = roster();
        r.preferences.consecutive = vec![types::ConsecutiveWeight {
            courses: vec!["Latin".into()],
            weight: 1,
        }];
        assert!(matches!(
            Catalog::build(&r),
            Err(StructuralError::UnknownCourse { .. })
        ));
    }
}
