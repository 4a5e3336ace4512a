use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(GroupId);
id_newtype!(CourseName);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn from_index(day: u8) -> Option<Self> {
        Self::ALL.get(day as usize).copied()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }
}

/// A (day, period) cell of the weekly grid. Days are 0-based, periods 1-based.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
pub struct TimeSlot {
    pub day: u8,
    pub period: u8,
}

impl TimeSlot {
    pub const fn new(day: u8, period: u8) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DayOfWeek::from_index(self.day) {
            Some(d) => write!(f, "{}-{}", d.short_name(), self.period),
            None => write!(f, "D{}-{}", self.day, self.period),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct WeekGrid {
    pub periods_per_day: Vec<u8>,
}

impl Default for WeekGrid {
    fn default() -> Self {
        Self {
            periods_per_day: vec![6, 8, 8, 6, 7],
        }
    }
}

impl WeekGrid {
    pub fn days(&self) -> usize {
        self.periods_per_day.len()
    }

    pub fn periods(&self, day: u8) -> u8 {
        self.periods_per_day.get(day as usize).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.periods_per_day.iter().map(|&p| p as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot.period >= 1 && slot.period <= self.periods(slot.day)
    }

    /// Linear position of `slot` in day-major order.
    pub fn index_of(&self, slot: TimeSlot) -> Option<usize> {
        if !self.contains(slot) {
            return None;
        }
        let before: usize = self.periods_per_day[..slot.day as usize]
            .iter()
            .map(|&p| p as usize)
            .sum();
        Some(before + slot.period as usize - 1)
    }

    pub fn slot_at(&self, mut index: usize) -> Option<TimeSlot> {
        for (day, &periods) in self.periods_per_day.iter().enumerate() {
            if index < periods as usize {
                return Some(TimeSlot::new(day as u8, index as u8 + 1));
            }
            index -= periods as usize;
        }
        None
    }

    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.periods_per_day
            .iter()
            .enumerate()
            .flat_map(|(day, &periods)| (1..=periods).map(move |p| TimeSlot::new(day as u8, p)))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    #[default]
    Administrative,
    Tracking,
}

/// How many days of the week may carry two periods of the same course.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DoubleDays {
    #[default]
    Unrestricted,
    AtMostOne,
    ExactlyOne,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct CourseRequirement {
    pub course: CourseName,
    pub hours: u32,
    pub teachers: Vec<TeacherId>,
    /// Allows two periods per day regardless of weekly hours (art-like courses).
    #[serde(default)]
    pub double_period: bool,
    #[serde(default)]
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub double_days: DoubleDays,
}

impl CourseRequirement {
    pub fn new(course: &str, hours: u32, teachers: &[&str]) -> Self {
        Self {
            course: course.into(),
            hours,
            teachers: teachers.iter().map(|&t| t.into()).collect(),
            double_period: false,
            max_per_day: None,
            double_days: DoubleDays::Unrestricted,
        }
    }

    pub fn daily_cap(&self) -> u32 {
        self.max_per_day.unwrap_or(if self.hours >= 5 || self.double_period {
            2
        } else {
            1
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct SlotPin {
    pub course: CourseName,
    pub slot: TimeSlot,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClassGroup {
    pub name: GroupId,
    #[serde(default)]
    pub grade: u8,
    #[serde(default)]
    pub kind: GroupKind,
    pub courses: Vec<CourseRequirement>,
    #[serde(default)]
    pub excluded: Vec<TimeSlot>,
    #[serde(default)]
    pub mandatory: Vec<SlotPin>,
    #[serde(default)]
    pub forbidden: Vec<SlotPin>,
}

impl ClassGroup {
    pub fn new(name: &str, courses: Vec<CourseRequirement>) -> Self {
        Self {
            name: name.into(),
            grade: 0,
            kind: GroupKind::Administrative,
            courses,
            excluded: Vec::new(),
            mandatory: Vec::new(),
            forbidden: Vec::new(),
        }
    }

    pub fn total_hours(&self) -> u32 {
        self.courses.iter().map(|c| c.hours).sum()
    }
}

/// One required (class group, course) pair.
#[derive(
    Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
pub struct LessonRef {
    pub group: GroupId,
    pub course: CourseName,
}

impl LessonRef {
    pub fn new(group: &str, course: &str) -> Self {
        Self {
            group: group.into(),
            course: course.into(),
        }
    }
}

impl fmt::Display for LessonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.course)
    }
}

/// A group, optionally narrowed to one of its courses.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct Scope {
    pub group: GroupId,
    #[serde(default)]
    pub course: Option<CourseName>,
}

impl Scope {
    pub fn group(group: &str) -> Self {
        Self {
            group: group.into(),
            course: None,
        }
    }

    pub fn lesson(group: &str, course: &str) -> Self {
        Self {
            group: group.into(),
            course: Some(course.into()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct JointSession {
    pub name: String,
    pub members: Vec<LessonRef>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// `antecedent` at a slot forces `consequent` at that slot; never the reverse.
    Implication {
        name: String,
        antecedent: LessonRef,
        consequent: LessonRef,
    },
    /// Both lessons occupy exactly the same slots.
    Sync {
        name: String,
        left: LessonRef,
        right: LessonRef,
    },
    /// `series` shares exactly `count` slots with the union of `overlapping`.
    OverlapCount {
        name: String,
        series: LessonRef,
        overlapping: Vec<LessonRef>,
        count: u32,
    },
    MutualExclusion {
        name: String,
        first: Vec<Scope>,
        second: Vec<Scope>,
    },
    RequiresAny {
        name: String,
        trigger: LessonRef,
        any_of: Vec<LessonRef>,
    },
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::Implication { name, .. }
            | Rule::Sync { name, .. }
            | Rule::OverlapCount { name, .. }
            | Rule::MutualExclusion { name, .. }
            | Rule::RequiresAny { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ConsecutiveWeight {
    pub courses: Vec<CourseName>,
    pub weight: i32,
}

fn default_min_per_day() -> u32 {
    2
}

fn default_reward() -> i32 {
    1
}

fn default_penalty() -> i32 {
    -1
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct DailyBundle {
    pub name: String,
    pub groups: Vec<GroupId>,
    pub courses: Vec<CourseName>,
    #[serde(default = "default_min_per_day")]
    pub min_per_day: u32,
    #[serde(default = "default_reward")]
    pub reward: i32,
    #[serde(default)]
    pub max_per_day: Option<u32>,
    #[serde(default = "default_penalty")]
    pub excess_weight: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct TeacherLoad {
    #[serde(default)]
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub max_first_period_days: Option<u32>,
    #[serde(default = "default_penalty")]
    pub weight: i32,
}

impl Default for TeacherLoad {
    fn default() -> Self {
        Self {
            max_per_day: None,
            max_first_period_days: None,
            weight: default_penalty(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default)]
pub struct Preferences {
    #[serde(default)]
    pub consecutive: Vec<ConsecutiveWeight>,
    #[serde(default)]
    pub daily_bundle: Vec<DailyBundle>,
    #[serde(default)]
    pub teacher_load: TeacherLoad,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Roster {
    #[serde(default)]
    pub grid: WeekGrid,
    pub classes: Vec<ClassGroup>,
    #[serde(default)]
    pub joint_sessions: Vec<JointSession>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Roster {
    pub fn new(classes: Vec<ClassGroup>) -> Self {
        Self {
            grid: WeekGrid::default(),
            classes,
            joint_sessions: Vec::new(),
            rules: Vec::new(),
            preferences: Preferences::default(),
        }
    }
}

fn default_time_limit() -> u64 {
    300
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SolveParams {
    #[serde(default = "default_time_limit")]
    pub time_limit_sec: u64,
    #[serde(default)]
    pub threads: Option<u32>,
    #[serde(default)]
    pub log_solver: bool,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            time_limit_sec: default_time_limit(),
            threads: None,
            log_solver: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct ScheduledLesson {
    pub group: GroupId,
    pub course: CourseName,
    pub teachers: Vec<TeacherId>,
    pub slot: TimeSlot,
}

/// Size of the compiled model, for diagnosing infeasible rosters.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct ModelStats {
    pub decision_vars: usize,
    pub aux_vars: usize,
    pub constraints: BTreeMap<String, usize>,
    pub objective_terms: BTreeMap<String, usize>,
    pub domain_by_group: BTreeMap<String, usize>,
}

/// Objective contribution per preference family, recomputed from a timetable.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct SoftBreakdown {
    pub consecutive_pairs: i64,
    pub consecutive: i64,
    pub bundle_days: i64,
    pub bundle: i64,
    pub bundle_excess: i64,
    pub teacher_daily_excess: i64,
    pub teacher_first_period_excess: i64,
    pub teacher_load: i64,
    pub objective: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SolveReport {
    pub status: SolveStatus,
    #[serde(default)]
    pub objective: Option<f64>,
    #[serde(default)]
    pub best_bound: Option<f64>,
    pub timetable: Vec<ScheduledLesson>,
    #[serde(default)]
    pub soft: Option<SoftBreakdown>,
    pub stats: ModelStats,
    pub elapsed_ms: u64,
}

impl SolveReport {
    /// Relative distance between the incumbent and the proven bound.
    pub fn gap(&self) -> Option<f64> {
        let (obj, bound) = (self.objective?, self.best_bound?);
        let denom = obj.abs().max(1e-9);
        Some(((bound - obj) / denom).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_grid_has_35_slots() {
        let grid = WeekGrid::default();
        assert_eq!(grid.len(), 35);
        assert_eq!(grid.slots().count(), 35);
        assert!(grid.contains(TimeSlot::new(1, 8)));
        assert!(!grid.contains(TimeSlot::new(0, 7)));
        assert!(!grid.contains(TimeSlot::new(4, 0)));
        assert!(!grid.contains(TimeSlot::new(5, 1)));
    }

    #[test]
    fn slot_display_uses_day_names() {
        assert_eq!(TimeSlot::new(1, 7).to_string(), "Tue-7");
        assert_eq!(TimeSlot::new(9, 2).to_string(), "D9-2");
    }

    #[test]
    fn daily_cap_follows_weekly_hours() {
        let mut c = CourseRequirement::new("Algebra", 5, &["Yuhan"]);
        assert_eq!(c.daily_cap(), 2);
        c.hours = 3;
        assert_eq!(c.daily_cap(), 1);
        c.double_period = true;
        assert_eq!(c.daily_cap(), 2);
        c.max_per_day = Some(1);
        assert_eq!(c.daily_cap(), 1);
    }

    #[test]
    fn roster_json_defaults() {
        let raw = serde_json::json!({
            "classes": [{
                "name": "9-A",
                "courses": [{"course": "Art", "hours": 2, "teachers": ["Shiwen"], "double_period": true}],
                "excluded": [{"day": 1, "period": 7}]
            }],
            "rules": [{
                "kind": "implication",
                "name": "psych-eal",
                "antecedent": {"group": "10-A", "course": "Psych&Geo"},
                "consequent": {"group": "10-EAL-A", "course": "EAL"}
            }]
        });
        let roster: Roster = serde_json::from_value(raw).unwrap();
        assert_eq!(roster.grid, WeekGrid::default());
        assert_eq!(roster.classes[0].kind, GroupKind::Administrative);
        assert_eq!(roster.classes[0].courses[0].double_days, DoubleDays::Unrestricted);
        assert!(matches!(roster.rules[0], Rule::Implication { .. }));
        assert_eq!(roster.rules[0].name(), "psych-eal");
        assert_eq!(roster.preferences.teacher_load.weight, -1);
    }

    #[test]
    fn gap_is_relative() {
        let report = SolveReport {
            status: SolveStatus::Feasible,
            objective: Some(100.0),
            best_bound: Some(110.0),
            timetable: vec![],
            soft: None,
            stats: ModelStats::default(),
            elapsed_ms: 0,
        };
        let gap = report.gap().unwrap();
        assert!((gap - 0.1).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn index_and_slot_are_inverse(periods in proptest::collection::vec(1u8..10, 1..7)) {
            let grid = WeekGrid { periods_per_day: periods };
            for (i, slot) in grid.slots().enumerate() {
                prop_assert_eq!(grid.index_of(slot), Some(i));
                prop_assert_eq!(grid.slot_at(i), Some(slot));
            }
            prop_assert_eq!(grid.slot_at(grid.len()), None);
        }
    }
}
