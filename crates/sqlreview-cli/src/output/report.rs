//! Human-readable review output.

use owo_colors::OwoColorize;
use sqlreview_core::{Advice, Status};
use std::fmt::{self, Write};
use std::time::Duration;

use super::FileReport;

/// Per-file verdict shown in the section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    fn of(file: &FileReport, threshold: Status) -> Self {
        if file.fails_at(threshold) {
            Verdict::Fail
        } else if file.report.is_clean() {
            Verdict::Pass
        } else {
            Verdict::Warn
        }
    }

    fn label(self, colored: bool) -> String {
        let (text, painted) = match self {
            Verdict::Pass => ("PASS", "PASS".green().to_string()),
            Verdict::Warn => ("WARN", "WARN".yellow().to_string()),
            Verdict::Fail => ("FAIL", "FAIL".red().to_string()),
        };
        if colored {
            painted
        } else {
            text.to_string()
        }
    }
}

/// Format review results as a per-file report followed by a summary line.
///
/// With `quiet`, only files that fail at `threshold` get a section.
pub fn format_report(
    reports: &[FileReport],
    threshold: Status,
    quiet: bool,
    colored: bool,
    elapsed: Duration,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, reports, threshold, quiet, colored, elapsed);
    out
}

fn write_report(
    out: &mut String,
    reports: &[FileReport],
    threshold: Status,
    quiet: bool,
    colored: bool,
    elapsed: Duration,
) -> fmt::Result {
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut findings = 0usize;

    for file in reports {
        let verdict = Verdict::of(file, threshold);
        if verdict == Verdict::Fail {
            failed += 1;
        } else {
            passed += 1;
        }
        findings += file.report.advices.iter().filter(|a| !a.is_ok()).count();

        if quiet && verdict != Verdict::Fail {
            continue;
        }
        write_file_section(out, file, verdict, colored)?;
    }

    writeln!(out, "All Finished in {}!", format_elapsed(elapsed))?;
    writeln!(
        out,
        "  {} passed. {} failed. {} findings.",
        count_str(passed, colored, Verdict::Pass),
        count_str(failed, colored, Verdict::Fail),
        findings
    )
}

fn write_file_section(
    out: &mut String,
    file: &FileReport,
    verdict: Verdict,
    colored: bool,
) -> fmt::Result {
    writeln!(out, "== [{}] {}", file.file, verdict.label(colored))?;

    for advice in file.report.advices.iter().filter(|a| !a.is_ok()) {
        writeln!(
            out,
            "L:{:>4} | {:>3} | {} | {}",
            line_str(advice),
            advice.code.0,
            status_str(advice.status, colored),
            advice.content
        )?;
    }
    Ok(())
}

fn line_str(advice: &Advice) -> String {
    if advice.line == 0 {
        "-".to_string()
    } else {
        advice.line.to_string()
    }
}

fn status_str(status: Status, colored: bool) -> String {
    let label = format!("{:<7}", status.as_str());
    if !colored {
        return label;
    }
    match status {
        Status::Error => label.red().to_string(),
        Status::Warning => label.yellow().to_string(),
        Status::Info => label.blue().to_string(),
        Status::Success => label.green().to_string(),
    }
}

fn count_str(count: usize, colored: bool, verdict: Verdict) -> String {
    let s = format!("{count} file{}", if count == 1 { "" } else { "s" });
    if !colored || count == 0 {
        return s;
    }
    match verdict {
        Verdict::Fail => s.red().to_string(),
        _ => s.green().to_string(),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if elapsed.as_millis() >= 1 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{}us", elapsed.as_micros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlreview_core::{review, Dialect, ReviewOptions, ReviewRequest, RuleSet};

    fn file_report(name: &str, sql: &str) -> FileReport {
        file_report_with(name, sql, ReviewOptions::default())
    }

    fn file_report_with(name: &str, sql: &str, options: ReviewOptions) -> FileReport {
        let report = review(&ReviewRequest {
            sql: sql.to_string(),
            dialect: Dialect::Mysql,
            rules: RuleSet::builtin().rules,
            options,
        })
        .unwrap();
        FileReport {
            file: name.to_string(),
            report,
        }
    }

    #[test]
    fn test_clean_file_passes() {
        let reports = vec![file_report("ok.sql", "SELECT id FROM users WHERE id = 1;")];
        let out = format_report(&reports, Status::Error, false, false, Duration::from_millis(3));

        assert!(out.contains("== [ok.sql] PASS"), "{out}");
        assert!(out.contains("All Finished in 3ms!"), "{out}");
        assert!(out.contains("1 file passed. 0 files failed. 0 findings."), "{out}");
    }

    #[test]
    fn test_warning_below_threshold_is_not_a_failure() {
        let reports = vec![file_report("purge.sql", "DELETE FROM users;")];
        let out = format_report(&reports, Status::Error, false, false, Duration::ZERO);

        assert!(out.contains("== [purge.sql] WARN"), "{out}");
        assert!(out.contains("L:   1 | 202 | warning |"), "{out}");
        assert!(out.contains("requires WHERE clause"), "{out}");
        assert!(out.contains("0 files failed. 1 findings."), "{out}");
    }

    #[test]
    fn test_warning_at_threshold_fails() {
        let reports = vec![file_report("purge.sql", "DELETE FROM users;")];
        let out = format_report(&reports, Status::Warning, false, false, Duration::ZERO);

        assert!(out.contains("== [purge.sql] FAIL"), "{out}");
        assert!(out.contains("1 file failed."), "{out}");
    }

    #[test]
    fn test_syntax_error_always_fails() {
        let reports = vec![file_report("broken.sql", "SELEC 1;")];
        let out = format_report(&reports, Status::Error, false, false, Duration::ZERO);

        assert!(out.contains("== [broken.sql] FAIL"), "{out}");
        assert!(out.contains("| 201 | error"), "{out}");
    }

    #[test]
    fn test_incomplete_review_fails() {
        let options = ReviewOptions {
            timeout_ms: Some(0),
            ..ReviewOptions::default()
        };
        let reports = vec![file_report_with(
            "slow.sql",
            "SELECT id FROM users WHERE id = 1;",
            options,
        )];
        assert!(!reports[0].report.complete);

        let out = format_report(&reports, Status::Error, false, false, Duration::ZERO);
        assert!(out.contains("== [slow.sql] FAIL"), "{out}");
        assert!(out.contains("|   4 | warning |"), "{out}");
        assert!(out.contains("0 files passed. 1 file failed."), "{out}");
    }

    #[test]
    fn test_quiet_hides_non_failing_files() {
        let reports = vec![
            file_report("ok.sql", "SELECT 1;"),
            file_report("broken.sql", "SELEC 1;"),
        ];
        let out = format_report(&reports, Status::Error, true, false, Duration::ZERO);

        assert!(!out.contains("ok.sql"), "{out}");
        assert!(out.contains("broken.sql"), "{out}");
        assert!(out.contains("1 file passed. 1 file failed."), "{out}");
    }

    #[test]
    fn test_format_elapsed_units() {
        assert_eq!(format_elapsed(Duration::from_micros(12)), "12us");
        assert_eq!(format_elapsed(Duration::from_millis(40)), "40ms");
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.50s");
    }
}
