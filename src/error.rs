use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid path pattern '{pattern}'")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("invalid regex '{pattern}'")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported config file extension: {}", .0.display())]
    UnsupportedConfigFormat(PathBuf),
    #[error("duplicate step name '{step}' in group '{group}'")]
    DuplicateStep { group: String, step: String },
    #[error("unknown format group: {0}")]
    UnknownGroup(String),
}

pub type Result<T> = eyre::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_step_names_group_and_step() {
        let err = Error::DuplicateStep {
            group: "misc".into(),
            step: "no swearing".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate step name 'no swearing' in group 'misc'"
        );
    }

    #[test]
    fn downcasts_through_eyre() {
        let report: eyre::Report = Error::UnknownGroup("java".into()).into();
        assert!(matches!(
            report.downcast_ref::<Error>(),
            Some(Error::UnknownGroup(name)) if name == "java"
        ));
    }
}
