//! Terminal task states and the per-run task ledger.

use itertools::Itertools;
use std::{num::NonZero, sync::Arc};
use strum::IntoEnumIterator;

use crate::{
    Result,
    format_group::{FormatGroup, FormatGroupExecutor},
    report::{GroupReport, ReportFormatter, Verdict},
};

/// The only states a task may end a run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum TaskState {
    Succeeded,
    UpToDate,
    NoSource,
    Failed,
}

/// Run-wide switches, passed in explicitly rather than read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// When false no step runs at all and every task ends as `NoSource`.
    pub enforce_check: bool,
    /// Set from the command line or environment. Beats every group's own
    /// `enforce_check`, in both directions.
    pub forced: Option<bool>,
    pub jobs: NonZero<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            enforce_check: true,
            forced: None,
            jobs: NonZero::<usize>::MIN,
        }
    }
}

impl RunConfig {
    /// Whether a group carrying `group_override` runs at all.
    pub fn enforces(&self, group_override: Option<bool>) -> bool {
        self.forced.or(group_override).unwrap_or(self.enforce_check)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub state: TaskState,
    /// `None` when the task never ran.
    pub report: Option<GroupReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub state: TaskState,
    records: Vec<TaskRecord>,
}

impl RunSummary {
    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn tasks(&self, state: TaskState) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter().filter(move |r| r.state == state)
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.tasks(state).count()
    }

    pub fn reports(&self) -> impl Iterator<Item = &GroupReport> {
        self.records.iter().filter_map(|r| r.report.as_ref())
    }

    /// Number of tasks in each state, in `TaskState` order.
    pub fn counts(&self) -> Vec<(TaskState, usize)> {
        TaskState::iter().map(|s| (s, self.count(s))).collect()
    }

    /// Checks that every known task ended in exactly one terminal state.
    ///
    /// A record holds a single `TaskState`, so the per-state counts always
    /// add up to the number of records. What can still go wrong is a task
    /// recorded twice.
    pub fn verify_settled(&self) -> Result<()> {
        if let Some(dup) = self.records.iter().map(|r| &r.name).duplicates().next() {
            eyre::bail!("task '{dup}' was recorded more than once");
        }
        Ok(())
    }

    /// Rendered diagnostics of every task that ran, in declared group order.
    pub fn render(&self) -> String {
        self.reports()
            .map(|r| ReportFormatter.render(r).0)
            .filter(|text| !text.is_empty())
            .join("\n")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TaskOutcomeAggregator;

impl TaskOutcomeAggregator {
    pub fn decide(&self, enforce_check: bool, reports: &[GroupReport]) -> TaskState {
        if !enforce_check {
            return TaskState::NoSource;
        }
        if reports.iter().all(|r| r.verdict() == Verdict::Pass) {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        }
    }

    /// Runs each group that is enforced and has targets, one after another.
    pub fn run(&self, config: &RunConfig, groups: &[FormatGroup]) -> RunSummary {
        let records = groups
            .iter()
            .map(|group| match self.skip_state(config, group) {
                Some(state) => self.skipped(group, state),
                None => self.record(group, FormatGroupExecutor.run(group)),
            })
            .collect();
        self.summarize(records)
    }

    /// Like [`run`](Self::run), with targets of each group spread over `config.jobs`.
    pub async fn run_parallel(
        &self,
        config: &RunConfig,
        groups: Vec<Arc<FormatGroup>>,
    ) -> Result<RunSummary> {
        let mut records = Vec::with_capacity(groups.len());
        for group in groups {
            let record = match self.skip_state(config, &group) {
                Some(state) => self.skipped(&group, state),
                None => {
                    let report = FormatGroupExecutor
                        .run_parallel(group.clone(), config.jobs)
                        .await?;
                    self.record(&group, report)
                }
            };
            records.push(record);
        }
        Ok(self.summarize(records))
    }

    fn skip_state(&self, config: &RunConfig, group: &FormatGroup) -> Option<TaskState> {
        if !config.enforces(group.enforce_check) {
            debug!("{}: enforce_check is off, not running", group.name);
            Some(TaskState::NoSource)
        } else if group.targets.is_empty() {
            debug!("{}: no targets", group.name);
            Some(TaskState::NoSource)
        } else {
            None
        }
    }

    fn skipped(&self, group: &FormatGroup, state: TaskState) -> TaskRecord {
        TaskRecord {
            name: group.name.clone(),
            state,
            report: None,
        }
    }

    fn record(&self, group: &FormatGroup, report: GroupReport) -> TaskRecord {
        let state = self.decide(true, std::slice::from_ref(&report));
        info!("{}: {state}", group.name);
        TaskRecord {
            name: group.name.clone(),
            state,
            report: Some(report),
        }
    }

    fn summarize(&self, records: Vec<TaskRecord>) -> RunSummary {
        let state = if records.iter().any(|r| r.state == TaskState::Failed) {
            TaskState::Failed
        } else if records.iter().any(|r| r.state == TaskState::Succeeded) {
            TaskState::Succeeded
        } else if !records.is_empty() && records.iter().all(|r| r.state == TaskState::UpToDate) {
            TaskState::UpToDate
        } else {
            TaskState::NoSource
        };
        RunSummary { state, records }
    }
}
