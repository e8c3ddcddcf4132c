//! Integration test: structured logging contract
//!
//! Validates that:
//! 1. LogEmitter writes JSONL that validates line by line.
//! 2. Verification results turn into valid log entries.
//! 3. The validation function catches schema violations.
//! 4. ArtifactIndex hashes files and serializes correctly.
//!
//! Run: cargo test -p klib-harness --test structured_log_test

use std::path::PathBuf;

use klib_harness::fixtures::FixtureSet;
use klib_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, sha256_hex, validate_log_file,
    validate_log_line,
};
use klib_harness::TestRunner;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("klib_log_test_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn emitter_writes_valid_jsonl() {
    let dir = scratch_dir("emitter");
    let log_path = dir.join("test_output.jsonl");

    {
        let mut emitter = LogEmitter::to_file(&log_path, "klib-test", "run-integ").unwrap();
        emitter.emit(LogLevel::Info, "test_start").unwrap();
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "fixture_case")
                    .with_mode("hardened")
                    .with_api("stdio", "sprintf")
                    .with_healing_action("EchoSpecifier")
                    .with_outcome(Outcome::Pass),
            )
            .unwrap();
        emitter.emit(LogLevel::Info, "test_end").unwrap();
        emitter.flush().unwrap();
    }

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 3, "Expected 3 log lines");
    assert!(errors.is_empty(), "Emitter output should validate: {errors:?}");

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines[0]["trace_id"].as_str().unwrap().ends_with("::001"));
    assert!(lines[1]["trace_id"].as_str().unwrap().ends_with("::002"));
    assert!(lines[2]["trace_id"].as_str().unwrap().ends_with("::003"));
    assert_eq!(lines[1]["campaign"], "klib-test");
    assert_eq!(lines[1]["symbol"], "sprintf");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn verification_results_log_cleanly() {
    let fixture = FixtureSet::from_json(
        r#"{
            "version":"v1",
            "family":"stdio",
            "captured_at":"2026-10-18T00:00:00Z",
            "cases":[
                {"name":"ok","function":"sprintf","spec_section":"klib vsprintf","inputs":{"format":"%d","args":[{"int":7}]},"expected_output":"1|7","mode":"both"},
                {"name":"wrong","function":"sprintf","spec_section":"klib vsprintf","inputs":{"format":"%d","args":[{"int":7}]},"expected_output":"1|8","mode":"both"}
            ]
        }"#,
    )
    .unwrap();
    let results = TestRunner::new("log", "strict").run(&fixture);
    assert_eq!(results.len(), 2);

    let dir = scratch_dir("results");
    let log_path = dir.join("results.jsonl");
    {
        let mut emitter = LogEmitter::to_file(&log_path, "klib-test", "run-results").unwrap();
        for result in &results {
            emitter.emit_entry(LogEntry::for_result(result)).unwrap();
        }
        emitter.flush().unwrap();
    }

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 2);
    assert!(errors.is_empty(), "{errors:?}");

    let content = std::fs::read_to_string(&log_path).unwrap();
    let failed: serde_json::Value = serde_json::from_str(content.lines().nth(1).unwrap()).unwrap();
    assert_eq!(failed["outcome"], "fail");
    assert_eq!(failed["level"], "error");
    assert_eq!(failed["details"]["actual"], "1|7");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn hardened_repairs_reach_the_log() {
    let fixture = FixtureSet::from_json(
        r#"{
            "version":"v1",
            "family":"stdio",
            "captured_at":"2026-10-18T00:00:00Z",
            "cases":[
                {"name":"truncate","function":"sprintf","spec_section":"klib hardened formatting","inputs":{"format":"hello world","buf_len":6},"expected_output":"5|hello","mode":"hardened"},
                {"name":"plain","function":"sprintf","spec_section":"klib vsprintf","inputs":{"format":"%d","args":[{"int":7}]},"expected_output":"1|7","mode":"strict"}
            ]
        }"#,
    )
    .unwrap();
    let hardened = TestRunner::new("heal", "hardened").run(&fixture);
    let strict = TestRunner::new("heal", "strict").run(&fixture);
    assert!(hardened[0].passed, "{:?}", hardened[0].diff);
    assert!(strict[0].passed, "{:?}", strict[0].diff);

    let repaired = LogEntry::for_result(&hardened[0]);
    assert_eq!(repaired.healing_action.as_deref(), Some("TruncateWithNull"));
    assert_eq!(repaired.mode.as_deref(), Some("hardened"));
    assert_eq!(LogEntry::for_result(&strict[0]).healing_action, None);

    let dir = scratch_dir("heal");
    let log_path = dir.join("heal.jsonl");
    {
        let mut emitter = LogEmitter::to_file(&log_path, "klib-test", "run-heal").unwrap();
        emitter.emit_entry(repaired).unwrap();
        emitter.flush().unwrap();
    }
    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 1);
    assert!(errors.is_empty(), "{errors:?}");
    let content = std::fs::read_to_string(&log_path).unwrap();
    let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(line["healing_action"], "TruncateWithNull");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn validation_catches_missing_fields() {
    let line = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"info","event":"test"}"#;
    let errors = validate_log_line(line, 1).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "trace_id"));

    let line = r#"{"trace_id":"a::b::c","level":"info","event":"test"}"#;
    let errors = validate_log_line(line, 2).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "timestamp"));

    let line = r#"{"timestamp":"2026-01-01T00:00:00Z","trace_id":"a::b::c"}"#;
    let errors = validate_log_line(line, 3).unwrap_err();
    assert!(errors.len() >= 2);
}

#[test]
fn validation_catches_invalid_enums() {
    let line = r#"{"timestamp":"T","trace_id":"a::b::c","level":"critical","event":"e"}"#;
    assert!(validate_log_line(line, 1).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","mode":"turbo"}"#;
    assert!(validate_log_line(line, 2).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","outcome":"maybe"}"#;
    assert!(validate_log_line(line, 3).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","api_family":"malloc"}"#;
    assert!(validate_log_line(line, 4).is_err());
}

#[test]
fn artifact_index_hashes_files() {
    let dir = scratch_dir("artifacts");
    let report = dir.join("report.md");
    std::fs::write(&report, b"# klib Conformance Report\n").unwrap();

    let mut idx = ArtifactIndex::new("run-001");
    idx.add_file(&report, "report_markdown").unwrap();

    let json = idx.to_json().unwrap();
    let restored: ArtifactIndex = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.index_version, 1);
    assert_eq!(restored.run_id, "run-001");
    assert_eq!(restored.artifacts.len(), 1);
    assert_eq!(restored.artifacts[0].kind, "report_markdown");
    assert_eq!(restored.artifacts[0].size_bytes, Some(26));
    assert_eq!(
        restored.artifacts[0].sha256,
        sha256_hex(b"# klib Conformance Report\n")
    );

    assert!(idx.add_file(&dir.join("missing.md"), "x").is_err());
    std::fs::remove_dir_all(&dir).ok();
}
