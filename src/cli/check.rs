use crate::{
    Result, diff,
    group_options::{Executed, GroupOptions, Project},
};

/// Runs format groups and reports problems without touching files
#[derive(clap::Args)]
#[clap(visible_alias = "c")]
pub struct Check {
    #[clap(flatten)]
    pub(crate) options: GroupOptions,
    /// Print a diff for every target the steps would change
    #[clap(long)]
    diff: bool,
}

impl Check {
    pub async fn run(&self, project: &Project) -> Result<()> {
        let executed = self.options.execute(project).await?;
        if self.diff {
            for diff in diffs(&executed) {
                print!("{diff}");
            }
        }
        super::exit_for(super::print_summary(&executed));
        Ok(())
    }
}

/// Unified diffs of every changed target, against the content it was read with.
fn diffs(executed: &Executed) -> Vec<String> {
    let mut out = vec![];
    for record in executed.summary.records() {
        let Some(report) = &record.report else {
            continue;
        };
        let Some(group) = executed.groups.iter().find(|g| g.name == record.name) else {
            continue;
        };
        for changed in &report.changed {
            let Some(original) = group.targets.iter().find(|t| t.path == changed.path) else {
                continue;
            };
            let path = changed.path.display().to_string();
            out.push(diff::render_unified_diff(
                &original.content,
                &changed.content,
                &format!("a/{path}"),
                &format!("b/{path}"),
            ));
        }
    }
    out
}
