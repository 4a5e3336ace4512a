use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const ROSTER: &str = r#"{
  "grid": { "periods_per_day": [2, 2] },
  "classes": [
    { "name": "9-A", "courses": [
        { "course": "Math", "hours": 2, "teachers": ["Rhee"] },
        { "course": "Art", "hours": 1, "teachers": ["Ono"] } ] },
    { "name": "9-B", "courses": [
        { "course": "Art", "hours": 1, "teachers": ["Ono"] } ] }
  ],
  "joint_sessions": [
    { "name": "art", "members": [
        { "group": "9-A", "course": "Art" },
        { "group": "9-B", "course": "Art" } ] }
  ]
}"#;

fn timetable(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_timetable"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("run timetable binary")
}

fn write(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn schema_describes_the_roster() {
    let out = timetable(&["schema"]);
    assert!(out.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(schema["properties"]["classes"].is_object());
    assert!(schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "classes"));
}

#[test]
fn solve_writes_a_report_that_verifies() {
    let dir = TempDir::new().unwrap();
    let roster = write(&dir, "roster.json", ROSTER);
    let report = dir.path().join("report.json");
    let report_arg = report.to_string_lossy().into_owned();

    let out = timetable(&["solve", &roster, "--time-limit", "30", "--out", &report_arg]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);
    assert!(text.contains("status:    optimal"));
    assert!(text.contains("9-A\n"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(Path::new(&report)).unwrap()).unwrap();
    assert_eq!(saved["status"], "optimal");
    assert_eq!(saved["timetable"].as_array().unwrap().len(), 4);

    let out = timetable(&["verify", &roster, &report_arg]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("hard rules: satisfied"));
}

#[test]
fn verify_reports_a_class_clash() {
    let dir = TempDir::new().unwrap();
    let roster = write(&dir, "roster.json", ROSTER);
    // Art runs jointly on Mon-1 but 9-A also has Math there
    let entries = r#"[
      {"group":"9-A","course":"Math","teachers":["Rhee"],"slot":{"day":0,"period":1}},
      {"group":"9-A","course":"Math","teachers":["Rhee"],"slot":{"day":1,"period":1}},
      {"group":"9-A","course":"Art","teachers":["Ono"],"slot":{"day":0,"period":1}},
      {"group":"9-B","course":"Art","teachers":["Ono"],"slot":{"day":0,"period":1}}
    ]"#;
    let tt = write(&dir, "tt.json", entries);

    let out = timetable(&["verify", &roster, &tt]);
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("hard rules: 1 defect(s)"), "{text}");
    assert!(text.contains("class 9-A double-booked at Mon-1"));
}

#[test]
fn check_flags_joint_hours_mismatch() {
    let dir = TempDir::new().unwrap();
    let roster = write(
        &dir,
        "roster.json",
        &ROSTER.replace(
            r#"{ "course": "Art", "hours": 1, "teachers": ["Ono"] } ] }
  ],"#,
            r#"{ "course": "Art", "hours": 2, "teachers": ["Ono"] } ] }
  ],"#,
        ),
    );

    let out = timetable(&["check", &roster]);
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("joint session art: member hours differ"), "{text}");
    assert!(text.contains("variables: 12 decision"));
}
