use std::{num::NonZero, path::PathBuf, sync::Arc};

use crate::{
    Result,
    config::Config,
    env, files,
    format_group::FormatGroup,
    task::{RunConfig, RunSummary, TaskOutcomeAggregator},
};

/// Where the project lives and which config file describes it.
#[derive(Debug, Clone)]
pub struct Project {
    pub cwd: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl Project {
    pub fn config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => Config::read(&self.cwd.join(path)),
            None => Config::get(&self.cwd),
        }
    }
}

#[derive(Debug, clap::Args)]
pub(crate) struct GroupOptions {
    /// Run only these format groups (default: all)
    pub groups: Vec<String>,
    /// Number of targets to format in parallel
    #[clap(short, long)]
    pub jobs: Option<NonZero<usize>>,
    /// Skip every group, even those whose config sets enforce_check = true
    #[clap(long, overrides_with = "enforce_check")]
    pub no_enforce_check: bool,
    /// Run every group, even those whose config sets enforce_check = false
    #[clap(long, overrides_with = "no_enforce_check")]
    pub enforce_check: bool,
}

/// A finished run plus the groups it ran, for commands that need the inputs.
pub(crate) struct Executed {
    pub config: Config,
    pub groups: Vec<Arc<FormatGroup>>,
    pub summary: RunSummary,
}

impl GroupOptions {
    fn should_enforce(&self) -> Option<bool> {
        if self.enforce_check {
            Some(true)
        } else if self.no_enforce_check {
            Some(false)
        } else {
            *env::FMTGATE_ENFORCE_CHECK
        }
    }

    pub(crate) fn run_config(&self, config: &Config) -> RunConfig {
        let jobs = self
            .jobs
            .or(*env::FMTGATE_JOBS)
            .or_else(|| std::thread::available_parallelism().ok())
            .unwrap_or(NonZero::<usize>::MIN);
        RunConfig {
            enforce_check: config.enforce_check,
            forced: self.should_enforce(),
            jobs,
        }
    }

    pub(crate) async fn execute(&self, project: &Project) -> Result<Executed> {
        let config = project.config()?;
        let run_config = self.run_config(&config);
        let any_enforced = config
            .select(&self.groups)?
            .iter()
            .any(|(_, g)| run_config.enforces(g.enforce_check));
        // nothing will run, so don't touch the file system
        let files = if any_enforced {
            files::list_files(config.root())?
        } else {
            debug!("enforce_check is off, skipping target resolution");
            vec![]
        };
        let groups = config
            .format_groups(&self.groups, &files)?
            .into_iter()
            .map(Arc::new)
            .collect::<Vec<_>>();
        let summary = TaskOutcomeAggregator
            .run_parallel(&run_config, groups.clone())
            .await?;
        summary.verify_settled()?;
        Ok(Executed {
            config,
            groups,
            summary,
        })
    }
}
