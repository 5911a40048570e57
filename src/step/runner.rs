//! Single step execution.
//!
//! The runner is the boundary between user step logic and the pipeline:
//! nothing raised by a step escapes it.

use std::{
    any::Any,
    cell::Cell,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

use super::{Step, StepError, StepFailure, StepResult};
use crate::target::Target;

thread_local! {
    static IN_STEP: Cell<bool> = const { Cell::new(false) };
}

static QUIET_STEP_PANICS: Once = Once::new();

/// Wraps the current panic hook so panics raised inside a step print nothing.
/// They come back as failures and are rendered with the group report.
fn install_panic_hook() {
    QUIET_STEP_PANICS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_STEP.get() {
                previous(info);
            }
        }));
    });
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StepRunner;

impl StepRunner {
    /// Applies `step` to `target`, advancing `target.content` on success.
    ///
    /// A returned error becomes [`StepResult::Failed`] with the error's own
    /// message. A panic is caught and reported with the error type `panic`.
    pub fn apply(&self, step: &Step, target: &mut Target) -> StepResult {
        install_panic_hook();
        IN_STEP.set(true);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            step.transform(&target.content, &target.path)
        }));
        IN_STEP.set(false);
        let err = match outcome {
            Ok(Ok(content)) => {
                if content != target.content {
                    trace!("{step}: changed {}", target.path.display());
                }
                target.content = content;
                return StepResult::Ok;
            }
            Ok(Err(err)) => err,
            Err(payload) => StepError::new("panic", panic_message(payload.as_ref())),
        };
        debug!(
            "{step}: failed on {}: {}",
            target.path.display(),
            err.message()
        );
        StepResult::Failed(StepFailure::new(&step.name, target.path.clone(), err))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "step panicked".to_string()
    }
}
