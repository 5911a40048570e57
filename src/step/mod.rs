//! Formatting steps and their failure capture.
//!
//! A step is a named transformation from file content to file content. Steps
//! never unwind into the pipeline: [`runner::StepRunner`] turns every error
//! (and every panic) into a [`result::StepResult`] so the exemption policy can
//! look at it before anything reaches the task layer.
//!
//! # Module Organization
//!
//! - [`result`] - `StepError`, `StepFailure` and `StepResult`
//! - [`runner`] - Applying one step to one target
//! - [`builtin`] - The small set of steps configurable from a config file
//!
//! # Usage
//!
//! ```ignore
//! let step = Step::new("no swearing", |content, _path| {
//!     if content.to_lowercase().contains("fubar") {
//!         return Err(StepError::msg("No swearing!"));
//!     }
//!     Ok(content.to_string())
//! });
//! ```

pub mod builtin;
pub mod result;
pub mod runner;

use std::{fmt, path::Path, sync::Arc};

pub use result::{StepError, StepFailure, StepResult};
pub use runner::StepRunner;

pub type StepFn = dyn Fn(&str, &Path) -> Result<String, StepError> + Send + Sync;

#[derive(Clone)]
pub struct Step {
    pub name: String,
    func: Arc<StepFn>,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &Path) -> Result<String, StepError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub(crate) fn transform(&self, content: &str, path: &Path) -> Result<String, StepError> {
        (self.func)(content, path)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}
