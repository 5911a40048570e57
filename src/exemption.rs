use indexmap::IndexSet;
use std::fmt;

use crate::{
    Result,
    glob::{self, MatchOptions, PathMatcher},
    step::StepFailure,
};

/// Declared exemptions for one format group.
///
/// A failure is exempt when its step was named in `ignore_error_for_step` or
/// its path matches an `ignore_error_for_path` pattern. Each failing
/// (step, path) pair is judged on its own; nothing else is ever exempt.
#[derive(Clone, Default)]
pub struct ExemptionPolicy {
    steps: IndexSet<String>,
    paths: Vec<PathMatcher>,
    patterns: Vec<String>,
    options: MatchOptions,
}

impl ExemptionPolicy {
    pub fn new<S, P>(steps: S, paths: P, options: MatchOptions) -> Result<Self>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let patterns: Vec<String> = paths.into_iter().map(Into::into).collect();
        Ok(Self {
            steps: steps.into_iter().map(Into::into).collect(),
            paths: glob::compile_all(&patterns, &options)?,
            patterns,
            options,
        })
    }

    pub fn is_exempt(&self, failure: &StepFailure) -> bool {
        is_exempt(&self.steps, &self.paths, &self.options, failure)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.paths.is_empty()
    }

    pub fn steps(&self) -> &IndexSet<String> {
        &self.steps
    }

    pub fn path_patterns(&self) -> &[String] {
        &self.patterns
    }
}

pub fn is_exempt(
    exempt_steps: &IndexSet<String>,
    exempt_paths: &[PathMatcher],
    options: &MatchOptions,
    failure: &StepFailure,
) -> bool {
    let by_step = if options.case_sensitive {
        exempt_steps.contains(&failure.step_name)
    } else {
        exempt_steps
            .iter()
            .any(|s| options.names_equal(s, &failure.step_name))
    };
    by_step || exempt_paths.iter().any(|m| m.is_match(&failure.target_path))
}

impl fmt::Debug for ExemptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExemptionPolicy")
            .field("steps", &self.steps)
            .field("paths", &self.patterns)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glob::PathSyntax;
    use std::path::PathBuf;

    fn failure(step: &str, path: &str) -> StepFailure {
        StepFailure {
            step_name: step.into(),
            target_path: PathBuf::from(path),
            message: "No swearing!".into(),
            error_type: "Rejected".into(),
            causes: vec![],
        }
    }

    fn policy(steps: &[&str], paths: &[&str]) -> ExemptionPolicy {
        ExemptionPolicy::new(
            steps.iter().copied(),
            paths.iter().copied(),
            MatchOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_policy_exempts_nothing() {
        let p = ExemptionPolicy::default();
        assert!(p.is_empty());
        assert!(!p.is_exempt(&failure("no swearing", "README.md")));
    }

    #[test]
    fn test_exempt_by_step_regardless_of_path() {
        let p = policy(&["no swearing"], &[]);
        assert!(p.is_exempt(&failure("no swearing", "README.md")));
        assert!(p.is_exempt(&failure("no swearing", "docs/other.md")));
        assert!(!p.is_exempt(&failure("line_endings", "README.md")));
    }

    #[test]
    fn test_exempt_by_path_regardless_of_step() {
        let p = policy(&[], &["README.md"]);
        assert!(p.is_exempt(&failure("no swearing", "README.md")));
        assert!(p.is_exempt(&failure("line_endings", "README.md")));
        assert!(!p.is_exempt(&failure("no swearing", "CHANGELOG.md")));
    }

    #[test]
    fn test_unrelated_exemptions_do_not_match() {
        let p = policy(&["nope"], &["nope"]);
        assert!(!p.is_exempt(&failure("no swearing", "README.md")));
    }

    #[test]
    fn test_path_globs() {
        let p = policy(&[], &["docs/**"]);
        assert!(p.is_exempt(&failure("x", "docs/a/b.md")));
        assert!(!p.is_exempt(&failure("x", "README.md")));
    }

    #[test]
    fn test_case_insensitive_option_covers_steps_and_paths() {
        let options = MatchOptions {
            syntax: PathSyntax::Exact,
            case_sensitive: false,
        };
        let p = ExemptionPolicy::new(["No Swearing"], ["readme.md"], options).unwrap();
        assert!(p.is_exempt(&failure("no swearing", "other.md")));
        assert!(p.is_exempt(&failure("other", "README.md")));
    }

    #[test]
    fn test_free_function_matches_method() {
        let p = policy(&["no swearing"], &["README.md"]);
        let f = failure("no swearing", "README.md");
        assert_eq!(
            is_exempt(p.steps(), &p.paths, &p.options, &f),
            p.is_exempt(&f)
        );
        assert_eq!(p.path_patterns(), ["README.md"]);
    }
}
