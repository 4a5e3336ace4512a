use thiserror::Error;
use types::{CourseName, GroupId, LessonRef, TimeSlot};

use crate::engine::BackendError;
use crate::validator::Defect;

/// Malformed roster input. Raised before any model is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("week grid must have 1-7 days with at least one period each")]
    InvalidGrid,
    #[error("duplicate class group {0}")]
    DuplicateGroup(GroupId),
    #[error("class group {group} lists course {course} twice")]
    DuplicateCourse { group: GroupId, course: CourseName },
    #[error("{lesson} requires zero weekly hours")]
    ZeroHours { lesson: LessonRef },
    #[error("{lesson} has no teacher")]
    MissingTeacher { lesson: LessonRef },
    #[error("{lesson} has daily cap {cap}, expected 1 or 2")]
    InvalidDailyCap { lesson: LessonRef, cap: u32 },
    #[error("class group {group} references slot {slot} outside the week grid")]
    SlotOutsideGrid { group: GroupId, slot: TimeSlot },
    #[error("mandatory slot {slot} for {lesson} is outside the class domain")]
    MandatoryOutsideDomain { lesson: LessonRef, slot: TimeSlot },
    #[error("{context} references unknown class group {group}")]
    UnknownGroup { context: String, group: GroupId },
    #[error("{context} references {lesson}, which is not a required course of that group")]
    UnknownLesson { context: String, lesson: LessonRef },
    #[error("{context} references course {course}, which no class group takes")]
    UnknownCourse { context: String, course: CourseName },
    #[error("{context} needs at least {min} member(s)")]
    TooFewMembers { context: String, min: usize },
    #[error("{context} lists {lesson} on both sides")]
    OverlappingSides { context: String, lesson: LessonRef },
    #[error("{context}: {reason}")]
    InvalidPreference { context: String, reason: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("{lesson} needs {required} slot(s) but only {available} remain after exclusions")]
    InsufficientDomain {
        lesson: LessonRef,
        required: u32,
        available: usize,
    },
    #[error("solution failed validation with {} defect(s)", defects.len())]
    Validation { defects: Vec<Defect> },
    #[error(transparent)]
    Backend(#[from] BackendError),
}
