//! Outcome values for a single step applied to a single target.

use std::{
    any::type_name,
    borrow::Cow,
    error::Error as StdError,
    fmt,
    iter,
    path::PathBuf,
};

/// The error a step transformation returns.
///
/// Converting any `std::error::Error` with `?` records the error's
/// fully-qualified type name, its own message, and its `source()` chain.
/// `StepError` does not implement `std::error::Error`; the blanket
/// conversion below would overlap with `From<T> for T` if it did.
pub struct StepError {
    error_type: Cow<'static, str>,
    message: String,
    causes: Vec<String>,
}

impl StepError {
    pub fn new(error_type: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            causes: vec![],
        }
    }

    /// A plain message failure, typed as [`StepError`] itself.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(type_name::<Self>(), message)
    }

    pub fn from_report(report: eyre::Report) -> Self {
        let mut chain = report.chain();
        let message = chain.next().map(|e| e.to_string()).unwrap_or_default();
        Self {
            error_type: Cow::Borrowed("eyre::Report"),
            message,
            causes: chain.map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.causes.push(cause.to_string());
        self
    }

    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl<E> From<E> for StepError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let causes = iter::successors(err.source(), |e| (*e).source())
            .map(|e| e.to_string())
            .collect();
        Self {
            error_type: type_name::<E>().into(),
            message: err.to_string(),
            causes,
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)?;
        for cause in &self.causes {
            write!(f, "\nCaused by: {cause}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step_name: String,
    pub target_path: PathBuf,
    pub message: String,
    pub error_type: String,
    pub causes: Vec<String>,
}

impl StepFailure {
    pub fn new(step_name: &str, target_path: PathBuf, err: StepError) -> Self {
        Self {
            step_name: step_name.to_string(),
            target_path,
            message: err.message,
            error_type: err.error_type.into_owned(),
            causes: err.causes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Ok,
    Failed(StepFailure),
}

impl StepResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, StepResult::Ok)
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            StepResult::Ok => None,
            StepResult::Failed(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_from_error_records_type_and_chain() {
        let err: StepError = Outer(std::io::Error::other("inner")).into();
        assert_eq!(err.message(), "outer");
        assert!(err.error_type().ends_with("::Outer"), "{}", err.error_type());
        assert_eq!(err.causes(), ["inner"]);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("template")]
    struct Template(#[source] Outer);

    #[test]
    fn test_nested_sources_are_walked_in_order() {
        let err: StepError = Template(Outer(std::io::Error::other("inner"))).into();
        assert_eq!(err.message(), "template");
        assert_eq!(err.causes(), ["outer", "inner"]);
    }

    #[test]
    fn test_msg_is_typed_as_step_error() {
        let err = StepError::msg("No swearing!");
        assert_eq!(err.to_string(), "No swearing!");
        assert!(err.error_type().ends_with("::StepError"), "{}", err.error_type());
    }

    #[test]
    fn test_from_report_splits_context_and_cause() {
        use eyre::WrapErr;
        let report = Err::<(), _>(std::io::Error::other("disk"))
            .wrap_err("reading template")
            .unwrap_err();
        let err = StepError::from_report(report);
        assert_eq!(err.message(), "reading template");
        assert_eq!(err.causes(), ["disk"]);
        assert_eq!(err.error_type(), "eyre::Report");
    }

    #[test]
    fn test_debug_lists_causes() {
        let err = StepError::new("custom::Kind", "top").with_cause("below");
        assert_eq!(format!("{err:?}"), "custom::Kind: top\nCaused by: below");
    }
}
