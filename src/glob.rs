use crate::{Result, error::Error};
use globset::{GlobBuilder, GlobMatcher};
use itertools::Itertools;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a path pattern string is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PathSyntax {
    /// The pattern must equal the path.
    Exact,
    /// The pattern names a directory (or the file itself) the path lives under.
    Prefix,
    /// Shell-style glob, `*` does not cross `/` but `**` does.
    #[default]
    Glob,
    /// A regular expression searched against the whole path string.
    Regex,
}

/// Shared matching rules for target selection and path exemptions.
///
/// Both sides are compiled from the same options so that a pattern which
/// selected a file as a target is guaranteed to exempt it too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct MatchOptions {
    pub syntax: PathSyntax,
    pub case_sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            syntax: PathSyntax::Glob,
            case_sensitive: true,
        }
    }
}

impl MatchOptions {
    /// Compares two step names under these options.
    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }
}

#[derive(Debug, Clone)]
pub enum PathMatcher {
    Exact { path: PathBuf, case_sensitive: bool },
    Prefix { path: PathBuf, case_sensitive: bool },
    Glob(GlobMatcher),
    Regex(Regex),
}

impl PathMatcher {
    pub fn new(pattern: &str, options: &MatchOptions) -> Result<Self> {
        let matcher = match options.syntax {
            PathSyntax::Exact => PathMatcher::Exact {
                path: normalize(Path::new(pattern)),
                case_sensitive: options.case_sensitive,
            },
            PathSyntax::Prefix => PathMatcher::Prefix {
                path: normalize(Path::new(pattern.trim_end_matches('/'))),
                case_sensitive: options.case_sensitive,
            },
            PathSyntax::Glob => {
                let glob = GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .empty_alternates(true)
                    .case_insensitive(!options.case_sensitive)
                    .build()
                    .map_err(|source| Error::InvalidGlob {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                PathMatcher::Glob(glob.compile_matcher())
            }
            PathSyntax::Regex => {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(!options.case_sensitive)
                    .build()
                    .map_err(|source| Error::InvalidRegex {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                PathMatcher::Regex(re)
            }
        };
        Ok(matcher)
    }

    pub fn is_match(&self, path: &Path) -> bool {
        let path = normalize(path);
        match self {
            PathMatcher::Exact {
                path: expected,
                case_sensitive,
            } => eq_path(expected, &path, *case_sensitive),
            PathMatcher::Prefix {
                path: prefix,
                case_sensitive,
            } => {
                if *case_sensitive {
                    path.starts_with(prefix)
                } else {
                    let lower = |p: &Path| PathBuf::from(p.to_string_lossy().to_lowercase());
                    lower(&path).starts_with(lower(prefix))
                }
            }
            PathMatcher::Glob(glob) => glob.is_match(&path),
            PathMatcher::Regex(re) => path.to_str().is_some_and(|s| re.is_match(s)),
        }
    }
}

pub fn compile_all<S: AsRef<str>>(patterns: &[S], options: &MatchOptions) -> Result<Vec<PathMatcher>> {
    patterns
        .iter()
        .map(|p| PathMatcher::new(p.as_ref(), options))
        .collect()
}

/// Returns the files matched by any of `patterns`, keeping the order of `files`.
pub fn get_matches<P: AsRef<Path>>(patterns: &[PathMatcher], files: &[P]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| patterns.iter().any(|m| m.is_match(f)))
        .map(|f| f.to_path_buf())
        .collect_vec()
}

// strips a leading "./" so declared paths and walked paths compare equal
fn normalize(path: &Path) -> PathBuf {
    path.strip_prefix(".").unwrap_or(path).to_path_buf()
}

fn eq_path(a: &Path, b: &Path, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(syntax: PathSyntax, case_sensitive: bool) -> MatchOptions {
        MatchOptions {
            syntax,
            case_sensitive,
        }
    }

    #[test]
    fn test_glob_exact_file() {
        let m = PathMatcher::new("README.md", &MatchOptions::default()).unwrap();
        assert!(m.is_match(Path::new("README.md")));
        assert!(m.is_match(Path::new("./README.md")));
        assert!(!m.is_match(Path::new("docs/README.md")));
        assert!(!m.is_match(Path::new("readme.md")));
    }

    #[test]
    fn test_glob_star_does_not_cross_separator() {
        let m = PathMatcher::new("*.md", &MatchOptions::default()).unwrap();
        assert!(m.is_match(Path::new("README.md")));
        assert!(!m.is_match(Path::new("docs/guide.md")));
        let m = PathMatcher::new("**/*.md", &MatchOptions::default()).unwrap();
        assert!(m.is_match(Path::new("docs/guide.md")));
    }

    #[test]
    fn test_glob_case_insensitive() {
        let m = PathMatcher::new("readme.MD", &opts(PathSyntax::Glob, false)).unwrap();
        assert!(m.is_match(Path::new("README.md")));
    }

    #[test]
    fn test_exact_and_prefix() {
        let exact = PathMatcher::new("src/lib.rs", &opts(PathSyntax::Exact, true)).unwrap();
        assert!(exact.is_match(Path::new("src/lib.rs")));
        assert!(!exact.is_match(Path::new("src/lib.rs.bak")));

        let prefix = PathMatcher::new("src/", &opts(PathSyntax::Prefix, true)).unwrap();
        assert!(prefix.is_match(Path::new("src/lib.rs")));
        assert!(!prefix.is_match(Path::new("srcs/lib.rs")));

        let prefix = PathMatcher::new("SRC", &opts(PathSyntax::Prefix, false)).unwrap();
        assert!(prefix.is_match(Path::new("src/lib.rs")));
    }

    #[test]
    fn test_regex() {
        let m = PathMatcher::new(r"^gen/.*\.rs$", &opts(PathSyntax::Regex, true)).unwrap();
        assert!(m.is_match(Path::new("gen/a.rs")));
        assert!(!m.is_match(Path::new("src/gen/a.rs")));
    }

    #[test]
    fn test_invalid_patterns_are_domain_errors() {
        let err = PathMatcher::new("a[", &MatchOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidGlob { .. })
        ));
        let err = PathMatcher::new("(", &opts(PathSyntax::Regex, true)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_get_matches_keeps_file_order() {
        let patterns = compile_all(&["*.md", "b.txt"], &MatchOptions::default()).unwrap();
        let files = ["b.txt", "a.md", "c.rs", "z.md"];
        assert_eq!(
            get_matches(&patterns, &files),
            vec![
                PathBuf::from("b.txt"),
                PathBuf::from("a.md"),
                PathBuf::from("z.md")
            ]
        );
    }

    #[test]
    fn test_names_equal() {
        assert!(MatchOptions::default().names_equal("no swearing", "no swearing"));
        assert!(!MatchOptions::default().names_equal("No Swearing", "no swearing"));
        assert!(opts(PathSyntax::Glob, false).names_equal("No Swearing", "no swearing"));
    }
}
