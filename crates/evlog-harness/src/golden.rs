#![forbid(unsafe_code)]

//! Golden transcripts for session scenarios.
//!
//! A golden file is the expected text of a scenario, one line per output
//! line, stored under `tests/golden/{name}.txt`. Lines starting with `#` are
//! comments.
//!
//! ```sh
//! BLESS=1 cargo test -p evlog-harness golden_
//! ```
//!
//! Missing golden files pass unless `EVLOG_GOLDEN_ENFORCE=1` or `CI=1` is
//! set.

use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a golden comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenOutcome {
    Pass,
    Fail,
    /// Golden file written instead of compared.
    Blessed,
}

/// Result of [`check_golden`].
#[derive(Debug)]
pub struct GoldenResult {
    pub scenario: String,
    pub outcome: GoldenOutcome,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    /// First differing line, if the files differ line by line.
    pub mismatch_index: Option<usize>,
}

impl GoldenResult {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.outcome != GoldenOutcome::Fail
    }

    /// Human-readable summary.
    #[must_use]
    pub fn format(&self) -> String {
        match self.outcome {
            GoldenOutcome::Pass => format!("PASS: {}", self.scenario),
            GoldenOutcome::Blessed => format!("BLESSED: {}", self.scenario),
            GoldenOutcome::Fail => {
                if self.expected.is_empty() {
                    format!("FAIL: {} - missing golden file", self.scenario)
                } else if let Some(idx) = self.mismatch_index {
                    format!(
                        "FAIL: {} - mismatch at line {}\n  expected: {}\n  actual:   {}",
                        self.scenario,
                        idx + 1,
                        self.expected.get(idx).map_or("<none>", String::as_str),
                        self.actual.get(idx).map_or("<none>", String::as_str),
                    )
                } else {
                    format!(
                        "FAIL: {} - {} lines expected, {} produced",
                        self.scenario,
                        self.expected.len(),
                        self.actual.len()
                    )
                }
            }
        }
    }
}

/// Path of the golden file for `scenario`.
#[must_use]
pub fn golden_path(base_dir: &Path, scenario: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("golden")
        .join(format!("{scenario}.txt"))
}

/// Load expected lines. A missing file is empty.
pub fn load_golden_lines(path: &Path) -> std::io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Write `lines` as the golden file at `path`.
pub fn save_golden_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = format!(
        "# Golden transcript - regenerate with BLESS=1\n{}\n",
        lines.join("\n")
    );
    fs::write(path, content)
}

/// Whether golden files should be rewritten.
#[must_use]
pub fn is_bless_mode() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Whether a missing golden file is a failure.
#[must_use]
pub fn is_golden_enforced() -> bool {
    let explicit = std::env::var("EVLOG_GOLDEN_ENFORCE")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let ci = std::env::var("CI").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    explicit || ci
}

/// Compare `actual` against `expected`.
#[must_use]
pub fn verify_lines(actual: &[String], expected: &[String]) -> (GoldenOutcome, Option<usize>) {
    if expected.is_empty() {
        if is_golden_enforced() {
            return (GoldenOutcome::Fail, None);
        }
        return (GoldenOutcome::Pass, None);
    }

    if let Some(i) = actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
    {
        return (GoldenOutcome::Fail, Some(i));
    }
    if actual.len() != expected.len() {
        return (GoldenOutcome::Fail, None);
    }
    (GoldenOutcome::Pass, None)
}

/// Compare `actual` with the golden file of `scenario`, or write it in
/// bless mode.
pub fn check_golden(
    base_dir: &Path,
    scenario: &str,
    actual: Vec<String>,
) -> std::io::Result<GoldenResult> {
    let path = golden_path(base_dir, scenario);
    if is_bless_mode() {
        save_golden_lines(&path, &actual)?;
        return Ok(GoldenResult {
            scenario: scenario.to_string(),
            outcome: GoldenOutcome::Blessed,
            expected: actual.clone(),
            actual,
            mismatch_index: None,
        });
    }

    let expected = load_golden_lines(&path)?;
    let (outcome, mismatch_index) = verify_lines(&actual, &expected);
    Ok(GoldenResult {
        scenario: scenario.to_string(),
        outcome,
        expected,
        actual,
        mismatch_index,
    })
}
