use dashmap::DashMap;
use std::{num::NonZero, sync::Arc};
use tokio::sync::Semaphore;

use crate::{
    Result,
    error::Error,
    exemption::ExemptionPolicy,
    report::GroupReport,
    step::{Step, StepFailure, StepResult, StepRunner},
    target::Target,
};

/// A named bundle of steps, targets and exemptions processed as one unit.
#[derive(Debug, Clone, Default)]
pub struct FormatGroup {
    pub name: String,
    pub steps: Vec<Step>,
    pub targets: Vec<Target>,
    pub exemptions: ExemptionPolicy,
    /// Overrides the run-wide `enforce_check` when set.
    pub enforce_check: Option<bool>,
}

impl FormatGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_step(mut self, step: Step) -> Result<Self> {
        if self.steps.iter().any(|s| s.name == step.name) {
            return Err(Error::DuplicateStep {
                group: self.name.clone(),
                step: step.name,
            }
            .into());
        }
        self.steps.push(step);
        Ok(self)
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_exemptions(mut self, exemptions: ExemptionPolicy) -> Self {
        self.exemptions = exemptions;
        self
    }

    pub fn with_enforce_check(mut self, enforce_check: bool) -> Self {
        self.enforce_check = Some(enforce_check);
        self
    }
}

/// What happened to one target after all of its steps were tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Clean { target: Target, changed: bool },
    Exempted(StepFailure),
    Failed(StepFailure),
}

/// Runs every step of a group over every target.
///
/// Evaluation is target-major: targets in declared order, and for each target
/// the steps in declared order. The first failing step ends that target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatGroupExecutor;

impl FormatGroupExecutor {
    #[tracing::instrument(level = "info", name = "group.run", skip_all, fields(group = %group.name))]
    pub fn run(&self, group: &FormatGroup) -> GroupReport {
        let outcomes = group
            .targets
            .iter()
            .map(|t| run_target(&group.steps, &group.exemptions, t.clone()));
        build_report(&group.name, outcomes)
    }

    /// Like [`run`](Self::run) but with up to `jobs` targets in flight.
    ///
    /// Outcomes are keyed by declared target index and read back in that
    /// order, so the report is identical to a sequential run.
    #[tracing::instrument(level = "info", name = "group.run_parallel", skip_all, fields(group = %group.name, jobs = jobs.get()))]
    pub async fn run_parallel(
        &self,
        group: Arc<FormatGroup>,
        jobs: NonZero<usize>,
    ) -> Result<GroupReport> {
        let semaphore = Arc::new(Semaphore::new(jobs.get()));
        let outcomes: Arc<DashMap<usize, TargetOutcome>> = Arc::new(DashMap::new());
        let mut set = tokio::task::JoinSet::new();
        for idx in 0..group.targets.len() {
            let permit = semaphore.clone().acquire_owned().await?;
            let group = group.clone();
            let outcomes = outcomes.clone();
            set.spawn_blocking(move || {
                let _permit = permit;
                let target = group.targets[idx].clone();
                let outcome = run_target(&group.steps, &group.exemptions, target);
                outcomes.insert(idx, outcome);
            });
        }
        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                match e.try_into_panic() {
                    Ok(e) => std::panic::resume_unwind(e),
                    Err(e) => return Err(e.into()),
                }
            }
        }
        let ordered = (0..group.targets.len()).filter_map(|idx| outcomes.remove(&idx).map(|(_, o)| o));
        Ok(build_report(&group.name, ordered))
    }
}

fn run_target(steps: &[Step], exemptions: &ExemptionPolicy, mut target: Target) -> TargetOutcome {
    let original = target.content.clone();
    for step in steps {
        if let StepResult::Failed(failure) = StepRunner.apply(step, &mut target) {
            if exemptions.is_exempt(&failure) {
                debug!(
                    "{step}: failure on {} is exempt",
                    failure.target_path.display()
                );
                return TargetOutcome::Exempted(failure);
            }
            return TargetOutcome::Failed(failure);
        }
    }
    let changed = target.content != original;
    TargetOutcome::Clean { target, changed }
}

fn build_report(group: &str, outcomes: impl Iterator<Item = TargetOutcome>) -> GroupReport {
    let mut report = GroupReport::new(group);
    for outcome in outcomes {
        report.target_count += 1;
        match outcome {
            TargetOutcome::Clean { target, changed } => {
                if changed {
                    report.changed.push(target);
                }
            }
            TargetOutcome::Exempted(failure) => report.exempted.push(failure),
            TargetOutcome::Failed(failure) => report.failures.push(failure),
        }
    }
    debug!(
        "{group}: {} targets, {} failures, {} exempted",
        report.target_count,
        report.failures.len(),
        report.exempted.len()
    );
    report
}
