#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;

use evlog_replay::ReplayError;
use evlog_replay::cli::{CheckConfigArgs, Cli, Commands, GuideStyle, RunArgs, run};
use tempfile::NamedTempFile;

fn file_with(suffix: &str, text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(text.as_bytes()).expect("write temp file");
    file
}

fn run_script(script: PathBuf, config: Option<PathBuf>, json: bool) -> Result<String, ReplayError> {
    let mut out = Vec::new();
    run(
        Cli {
            command: Commands::Run(RunArgs {
                script,
                config,
                json,
                guides: GuideStyle::Ascii,
            }),
        },
        &mut out,
    )?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn bundled_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts/drawing.evlog")
}

#[test]
fn bundled_script_replays_as_json() {
    let out = run_script(bundled_script(), None, true).unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(report["shows"].as_array().unwrap().len(), 4);
    // click 1 walked back to the run head, collapse 1 stepped to its end.
    assert_eq!(report["shows"][2]["snapshot"]["current"], "0:1");
    assert_eq!(report["shows"][2]["snapshot"]["redo"]["label"], "Redo: Fill red");
    // The commit discarded the fill.
    let applied: Vec<&str> = report["final"]["applied"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        applied,
        vec!["Move shape", "Move shape", "Move shape", "Delete shape"]
    );
    assert_eq!(report["handler_runs"], 2);
}

#[test]
fn text_output_has_a_section_per_show() {
    let out = run_script(bundled_script(), None, false).unwrap();
    let sections: Vec<&str> = out.lines().filter(|l| l.starts_with("== ")).collect();
    assert_eq!(
        sections,
        vec!["== line 7", "== line 9", "== line 12", "== line 14", "== final"]
    );
    assert!(out.contains("undo: Undo: Delete shape"));
}

#[test]
fn config_file_changes_labels_and_grouping() {
    let config = file_with(
        ".toml",
        "[grouping]\nenabled = false\n[labels]\nundo = \"Revert\"\n",
    );
    let script = file_with(".evlog", "commit move Move\ncommit move Move\n");
    let out = run_script(
        script.path().to_path_buf(),
        Some(config.path().to_path_buf()),
        true,
    )
    .unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = report["final"]["rows"].as_array().unwrap();
    assert!(rows.iter().all(|row| row["depth"] == 0));
    assert_eq!(report["final"]["undo"]["label"], "Revert: Move");
}

#[test]
fn json_config_is_accepted() {
    let config = file_with(".json", r#"{"labels": {"unchanged": "(clean)"}}"#);
    let script = file_with(".evlog", "show\n");
    let out = run_script(
        script.path().to_path_buf(),
        Some(config.path().to_path_buf()),
        false,
    )
    .unwrap();
    assert!(out.contains("  0   (clean)"));
}

#[test]
fn invalid_config_fails_with_config_code() {
    let config = file_with(".toml", "[labels]\nredo = \"  \"\n");
    let script = file_with(".evlog", "show\n");
    let err = run_script(
        script.path().to_path_buf(),
        Some(config.path().to_path_buf()),
        false,
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("labels.redo must not be empty"));
}

#[test]
fn parse_errors_stop_before_replay() {
    let script = file_with(".evlog", "commit a A\nfrobnicate\n");
    let err = run_script(script.path().to_path_buf(), None, false).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.to_string(), "line 2: unknown command `frobnicate`");
}

#[test]
fn check_config_prints_effective_values() {
    let config = file_with(".toml", "[view]\nscroll_to_current = false\n");
    let mut out = Vec::new();
    run(
        Cli {
            command: Commands::CheckConfig(CheckConfigArgs {
                file: config.path().to_path_buf(),
            }),
        },
        &mut out,
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("is valid"));
    assert!(text.contains("scroll_to_current = false"));
    assert!(text.contains("collapse_on_leave = true"));
    assert!(text.contains("unchanged = \"[Unchanged]\""));
}
