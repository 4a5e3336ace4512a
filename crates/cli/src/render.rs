use std::fmt::Write;

use timetable_core::{FeasibilityReport, Verification};
use types::{DayOfWeek, ModelStats, Roster, ScheduledLesson, SolveReport, TimeSlot, WeekGrid};

const MIN_CELL: usize = 5;

fn day_label(day: u8) -> String {
    DayOfWeek::from_index(day)
        .map(|d| d.short_name().to_string())
        .unwrap_or_else(|| format!("D{day}"))
}

fn cell(timetable: &[ScheduledLesson], group: &str, slot: TimeSlot) -> String {
    let courses: Vec<&str> = timetable
        .iter()
        .filter(|e| e.group.as_str() == group && e.slot == slot)
        .map(|e| e.course.as_str())
        .collect();
    if courses.is_empty() {
        "-".to_string()
    } else {
        courses.join("/")
    }
}

/// Period-by-day table of one class group.
pub fn class_grid(grid: &WeekGrid, timetable: &[ScheduledLesson], group: &str) -> String {
    let days = grid.days();
    let rows = grid.periods_per_day.iter().copied().max().unwrap_or(0);
    let mut cells = vec![vec![String::new(); days]; rows as usize];
    for (day, row) in (0..days as u8).flat_map(|d| (1..=grid.periods(d)).map(move |p| (d, p))) {
        cells[row as usize - 1][day as usize] = cell(timetable, group, TimeSlot::new(day, row));
    }
    let width = cells
        .iter()
        .flatten()
        .map(|c| c.len())
        .max()
        .unwrap_or(0)
        .max(MIN_CELL);

    let mut out = String::new();
    let _ = writeln!(out, "{group}");
    let _ = write!(out, "    ");
    for d in 0..days as u8 {
        let _ = write!(out, " {:<width$}", day_label(d));
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
    for (p, row) in cells.iter().enumerate() {
        let _ = write!(out, "{:>3} ", p + 1);
        for c in row {
            let _ = write!(out, " {c:<width$}");
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}

/// One grid per class group, in roster order.
pub fn class_grids(roster: &Roster, timetable: &[ScheduledLesson]) -> String {
    roster
        .classes
        .iter()
        .map(|c| class_grid(&roster.grid, timetable, c.name.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every slot of the week with the lessons running in it.
pub fn slot_view(grid: &WeekGrid, timetable: &[ScheduledLesson]) -> String {
    let mut out = String::new();
    for slot in grid.slots() {
        let running: Vec<String> = timetable
            .iter()
            .filter(|e| e.slot == slot)
            .map(|e| {
                let teachers: Vec<&str> = e.teachers.iter().map(|t| t.as_str()).collect();
                format!("{} {} ({})", e.group, e.course, teachers.join(", "))
            })
            .collect();
        let listed = if running.is_empty() {
            "-".to_string()
        } else {
            running.join("; ")
        };
        let _ = writeln!(out, "{:<6} {listed}", slot.to_string());
    }
    out
}

pub fn summary(report: &SolveReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status:    {}", report.status);
    if let Some(objective) = report.objective {
        let _ = write!(out, "objective: {objective}");
        if let (Some(bound), Some(gap)) = (report.best_bound, report.gap()) {
            let _ = write!(out, " (bound {bound}, gap {:.2}%)", gap * 100.0);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "lessons:   {}", report.timetable.len());
    let _ = writeln!(out, "elapsed:   {} ms", report.elapsed_ms);
    out
}

pub fn model_stats(stats: &ModelStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "variables: {} decision, {} auxiliary",
        stats.decision_vars, stats.aux_vars
    );
    for (category, rows) in stats.constraints.iter().filter(|(_, &n)| n > 0) {
        let _ = writeln!(out, "  {category:<20} {rows}");
    }
    for (group, open) in &stats.domain_by_group {
        let _ = writeln!(out, "  domain {group:<13} {open} slot(s)");
    }
    out
}

pub fn findings(report: &FeasibilityReport) -> String {
    if report.is_clean() {
        return "pre-check: no findings\n".to_string();
    }
    let mut out = format!("pre-check: {} finding(s)\n", report.findings.len());
    for f in &report.findings {
        let _ = writeln!(out, "  {f}");
    }
    out
}

pub fn verification(v: &Verification) -> String {
    let mut out = String::new();
    if v.defects.is_empty() {
        out.push_str("hard rules: satisfied\n");
    } else {
        let _ = writeln!(out, "hard rules: {} defect(s)", v.defects.len());
        for d in &v.defects {
            let _ = writeln!(out, "  [{}] {d}", d.category());
        }
    }
    let _ = writeln!(out, "soft score: {}", v.soft.objective);
    out
}
