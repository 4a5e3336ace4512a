use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use types::{Roster, ScheduledLesson, SolveReport};

pub fn load_roster(path: &Path) -> Result<Roster> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading roster {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing roster {}", path.display()))
}

/// A timetable file is either a full solve report or a bare list of entries.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimetableFile {
    Report(SolveReport),
    Entries(Vec<ScheduledLesson>),
}

pub fn load_timetable(path: &Path) -> Result<Vec<ScheduledLesson>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading timetable {}", path.display()))?;
    let file: TimetableFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing timetable {}", path.display()))?;
    Ok(match file {
        TimetableFile::Report(report) => report.timetable,
        TimetableFile::Entries(entries) => entries,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::TimeSlot;

    #[test]
    fn roster_defaults_fill_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(
            &path,
            r#"{"classes":[{"name":"9-A","courses":[{"course":"Math","hours":4,"teachers":["Rhee"]}]}]}"#,
        )
        .unwrap();
        let roster = load_roster(&path).unwrap();
        assert_eq!(roster.grid.periods_per_day, vec![6, 8, 8, 6, 7]);
        assert!(roster.joint_sessions.is_empty());
        assert_eq!(roster.classes[0].courses[0].daily_cap(), 1);
    }

    #[test]
    fn timetable_accepts_bare_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tt.json");
        fs::write(
            &path,
            r#"[{"group":"9-A","course":"Math","teachers":["Rhee"],"slot":{"day":0,"period":1}}]"#,
        )
        .unwrap();
        let entries = load_timetable(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slot, TimeSlot::new(0, 1));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_roster(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/roster.json"));
    }
}
