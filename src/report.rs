use itertools::Itertools;

use crate::{step::StepFailure, target::Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Everything one format group run produced.
///
/// `failures` and `exempted` are in evaluation order: declared target order,
/// then declared step order within a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReport {
    pub group: String,
    /// Failures no exemption matched. Any entry here fails the group.
    pub failures: Vec<StepFailure>,
    /// Failures an exemption matched; reported but never fatal.
    pub exempted: Vec<StepFailure>,
    /// Targets that went through every step and came out different.
    pub changed: Vec<Target>,
    pub target_count: usize,
}

impl GroupReport {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.failures.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders the diagnostic text for `report`.
    ///
    /// Only the leading lines are meant to be matched literally; cause lines
    /// depend on the step's error and may differ between versions.
    pub fn render(&self, report: &GroupReport) -> (String, Verdict) {
        let verdict = report.verdict();
        let mut lines = report
            .exempted
            .iter()
            .map(|f| {
                format!(
                    "Unable to apply step '{}' to '{}'",
                    f.step_name,
                    f.target_path.display()
                )
            })
            .collect_vec();
        if verdict == Verdict::Fail {
            for failure in &report.failures {
                lines.extend(problem_block(failure));
            }
        }
        (lines.join("\n"), verdict)
    }
}

fn problem_block(failure: &StepFailure) -> Vec<String> {
    let mut block = vec![
        format!(
            "Step '{}' found problem in '{}':",
            failure.step_name,
            failure.target_path.display()
        ),
        failure.message.clone(),
        format!("{}: {}", failure.error_type, failure.message),
    ];
    block.extend(failure.causes.iter().map(|c| format!("Caused by: {c}")));
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn failure(step: &str, path: &str) -> StepFailure {
        StepFailure {
            step_name: step.into(),
            target_path: PathBuf::from(path),
            message: "No swearing!".into(),
            error_type: "fmtgate::step::builtin::Rejected".into(),
            causes: vec![],
        }
    }

    #[test]
    fn test_empty_report_passes_silently() {
        let (text, verdict) = ReportFormatter.render(&GroupReport::new("misc"));
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(text, "");
    }

    #[test]
    fn test_failure_block() {
        let mut report = GroupReport::new("misc");
        report.failures.push(failure("no swearing", "README.md"));
        let (text, verdict) = ReportFormatter.render(&report);
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(
            text,
            "Step 'no swearing' found problem in 'README.md':\n\
             No swearing!\n\
             fmtgate::step::builtin::Rejected: No swearing!"
        );
    }

    #[test]
    fn test_exempted_lines_come_first_and_do_not_fail() {
        let mut report = GroupReport::new("misc");
        report.exempted.push(failure("no swearing", "README.md"));
        let (text, verdict) = ReportFormatter.render(&report);
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(text, "Unable to apply step 'no swearing' to 'README.md'");

        report.failures.push(failure("other", "CHANGELOG.md"));
        let (text, verdict) = ReportFormatter.render(&report);
        assert_eq!(verdict, Verdict::Fail);
        let lines = text.lines().collect_vec();
        assert_eq!(lines[0], "Unable to apply step 'no swearing' to 'README.md'");
        assert_eq!(lines[1], "Step 'other' found problem in 'CHANGELOG.md':");
    }

    #[test]
    fn test_causes_follow_type_line() {
        let mut report = GroupReport::new("misc");
        let mut f = failure("io", "a.txt");
        f.causes = vec!["permission denied".into()];
        report.failures.push(f);
        let (text, _) = ReportFormatter.render(&report);
        assert!(text.ends_with("No swearing!\nCaused by: permission denied"));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Pass.to_string(), "PASS");
        assert_eq!(Verdict::Fail.to_string(), "FAIL");
    }
}
