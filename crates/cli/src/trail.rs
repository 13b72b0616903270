// Console trail: human-readable rendering of a RunLog.

use std::fmt::Write;
use std::path::Path;

use dbdiff_engine::RunLog;

pub fn render(log: &RunLog, output: &Path) -> String {
    let mut out = String::new();

    if !log.only_left.is_empty() {
        let _ = writeln!(out, "Sheets only in file1 ({}): {}", log.labels.left, list(&log.only_left));
    }
    if !log.only_right.is_empty() {
        let _ = writeln!(out, "Sheets only in file2 ({}): {}", log.labels.right, list(&log.only_right));
    }

    for report in &log.sheets {
        let _ = writeln!(out, "Comparing: {}", report.sheet);
        let _ = writeln!(out, "  {}", report.outcome);
    }

    let _ = writeln!(out, "Done. Output: {}", output.display());
    out
}

fn list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}
