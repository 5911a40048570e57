//! Steps that can be declared in a config file.
//!
//! Formatting algorithms are not the point of this crate; these exist so a
//! group can be run from the command line without writing Rust.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use super::{Step, StepError};
use crate::{Result, error::Error};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepConfig {
    /// Normalizes every line ending.
    LineEndings {
        name: Option<String>,
        #[serde(default)]
        ending: LineEnding,
    },
    TrimTrailingWhitespace {
        name: Option<String>,
    },
    /// Ensures the content ends with exactly one newline.
    EndWithNewline {
        name: Option<String>,
    },
    /// Regex search and replace; `replacement` supports `$1` style groups.
    Replace {
        name: String,
        pattern: String,
        replacement: String,
    },
    /// Fails with `message` whenever `pattern` is found in the content.
    Forbid {
        name: String,
        pattern: String,
        message: String,
        #[serde(default)]
        case_insensitive: bool,
    },
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Unix,
    Windows,
}

/// Raised by a `forbid` step.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Rejected(pub String);

impl StepConfig {
    pub fn name(&self) -> &str {
        match self {
            StepConfig::LineEndings { name, .. } => name.as_deref().unwrap_or("line_endings"),
            StepConfig::TrimTrailingWhitespace { name } => {
                name.as_deref().unwrap_or("trim_trailing_whitespace")
            }
            StepConfig::EndWithNewline { name } => name.as_deref().unwrap_or("end_with_newline"),
            StepConfig::Replace { name, .. } | StepConfig::Forbid { name, .. } => name,
        }
    }

    pub fn build(&self) -> Result<Step> {
        let name = self.name().to_string();
        let step = match self {
            StepConfig::LineEndings { ending, .. } => {
                let ending = *ending;
                Step::new(name, move |content, _| Ok(normalize_line_endings(content, ending)))
            }
            StepConfig::TrimTrailingWhitespace { .. } => {
                Step::new(name, |content, _| Ok(trim_trailing_whitespace(content)))
            }
            StepConfig::EndWithNewline { .. } => {
                Step::new(name, |content, _| Ok(end_with_newline(content)))
            }
            StepConfig::Replace {
                pattern,
                replacement,
                ..
            } => {
                let re = RegexBuilder::new(pattern)
                    .multi_line(true)
                    .build()
                    .map_err(|source| Error::InvalidRegex {
                        pattern: pattern.clone(),
                        source,
                    })?;
                let replacement = replacement.clone();
                Step::new(name, move |content, _| {
                    Ok(re.replace_all(content, replacement.as_str()).into_owned())
                })
            }
            StepConfig::Forbid {
                pattern,
                message,
                case_insensitive,
                ..
            } => {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .multi_line(true)
                    .build()
                    .map_err(|source| Error::InvalidRegex {
                        pattern: pattern.clone(),
                        source,
                    })?;
                let message = message.clone();
                Step::new(name, move |content, _| {
                    if re.is_match(content) {
                        return Err(StepError::from(Rejected(message.clone())));
                    }
                    Ok(content.to_string())
                })
            }
        };
        Ok(step)
    }
}

fn normalize_line_endings(content: &str, ending: LineEnding) -> String {
    let unix = content.replace("\r\n", "\n").replace('\r', "\n");
    match ending {
        LineEnding::Unix => unix,
        LineEnding::Windows => unix.replace('\n', "\r\n"),
    }
}

fn trim_trailing_whitespace(content: &str) -> String {
    content
        .split_inclusive('\n')
        .map(|line| {
            let (body, eol) = match line.strip_suffix("\r\n") {
                Some(body) => (body, "\r\n"),
                None => match line.strip_suffix('\n') {
                    Some(body) => (body, "\n"),
                    None => (line, ""),
                },
            };
            format!("{}{eol}", body.trim_end_matches([' ', '\t']))
        })
        .collect()
}

fn end_with_newline(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let mut out = content.trim_end_matches(['\n', '\r']).to_string();
    out.push('\n');
    out
}
