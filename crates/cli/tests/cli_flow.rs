use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::tempdir;

fn flex() -> Command {
    let mut cmd = Command::cargo_bin("flex").unwrap();
    cmd.env_remove("FLEX_HISTORY_FILE").env_remove("FLEX_BIND");
    cmd
}

#[test]
fn analyze_prints_renderer_graph() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("sample.py");
    fs::write(&source, "def fact(n):\n    return fact(n - 1)\n").unwrap();

    let output = flex()
        .args(["--quiet", "analyze"])
        .arg(&source)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["nodes"][0]["id"], "0");
    assert_eq!(value["nodes"][1]["data"]["label"], "Function: fact");
    assert_eq!(
        value["nodes"][3]["data"]["error"],
        "Recursive call detected: 'fact' calls itself."
    );
    assert_eq!(value["nodes"][3]["type"], "default");
    assert_eq!(value["nodes"][3]["position"]["x"], 0.0);
    assert_eq!(value["edges"].as_array().unwrap().len(), 3);
}

#[test]
fn analyze_reads_stdin_and_merges_review() {
    let dir = tempdir().unwrap();
    let review = dir.path().join("review.txt");
    fs::write(
        &review,
        "Review follows.\n{\"high_level_feedback\": {\"summary\": \"Tiny.\"}, \"errors\": [{\"id\": \"1\", \"description\": \"Unused variable.\"}]}\nThanks!",
    )
    .unwrap();

    flex()
        .args(["-q", "analyze", "-", "--review"])
        .arg(&review)
        .write_stdin("x = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"error\":\"Unused variable.\""))
        .stdout(predicate::str::contains("\"summary\":\"Tiny.\""));
}

#[test]
fn analyze_reports_syntax_errors() {
    flex()
        .args(["-q", "analyze"])
        .write_stdin("def broken(:\n    pass\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\":\"syntax_error\""))
        .stdout(predicate::str::contains("\"nodes\"").not());
}

#[test]
fn recover_extracts_fenced_json() {
    flex()
        .args(["-q", "recover"])
        .write_stdin("Sure!\n```json\n{\"a\": 1}\n```\n")
        .assert()
        .success()
        .stdout("{\"a\":1}\n");
}

#[test]
fn recover_exhaustion_prints_null() {
    flex()
        .args(["-q", "recover"])
        .write_stdin("not json at all")
        .assert()
        .code(2)
        .stdout("null\n");
}

#[test]
fn history_of_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    flex()
        .args(["-q", "history", "--history"])
        .arg(dir.path().join("none.json"))
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn history_file_can_come_from_env() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(
        &path,
        r#"[{"code": "x = 1", "labels": ["Module"], "hints": []}]"#,
    )
    .unwrap();

    flex()
        .env("FLEX_HISTORY_FILE", &path)
        .args(["-q", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\":\"x = 1\""));
}

#[test]
fn schema_describes_analysis_response() {
    flex()
        .args(["-q", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AnalyzeResponse"))
        .stdout(predicate::str::contains("high_level_feedback"));
}

#[test]
fn rules_are_listed_in_evaluation_order() {
    let output = flex().args(["-q", "rules"]).output().unwrap();
    assert!(output.status.success());

    let names: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "empty_body");
    assert_eq!(names[6], "handlerless_try");
}

#[test]
fn analyze_rejects_other_languages() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("main.rs");
    fs::write(&source, "fn main() {}\n").unwrap();

    flex()
        .args(["-q", "analyze"])
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported language: rust"));
}
