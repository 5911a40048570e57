use eyre::WrapErr;
use std::path::PathBuf;

use crate::{
    Result,
    group_options::{Executed, GroupOptions, Project},
    task::TaskState,
};

/// Runs format groups and writes the formatted content back
#[derive(clap::Args)]
#[clap(visible_alias = "a")]
pub struct Apply {
    #[clap(flatten)]
    pub(crate) options: GroupOptions,
}

impl Apply {
    pub async fn run(&self, project: &Project) -> Result<()> {
        let executed = self.options.execute(project).await?;
        write_back(&executed)?;
        super::exit_for(super::print_summary(&executed));
        Ok(())
    }
}

/// Writes every changed target of a succeeded group, returning the written paths.
fn write_back(executed: &Executed) -> Result<Vec<PathBuf>> {
    let root = executed.config.root();
    let mut written = vec![];
    for record in executed.summary.records() {
        // a failing group leaves every file untouched
        if record.state != TaskState::Succeeded {
            continue;
        }
        let Some(report) = &record.report else {
            continue;
        };
        for target in &report.changed {
            let path = root.join(&target.path);
            std::fs::write(&path, &target.content)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!("{}: formatted {}", record.name, target.path.display());
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, num::NonZero};
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[groups.docs]
target = ["*.md"]

[[groups.docs.steps]]
type = "line_endings"

[[groups.docs.steps]]
type = "forbid"
name = "no swearing"
pattern = "fubar"
message = "No swearing!"

[groups.text]
target = ["*.txt"]

[[groups.text.steps]]
type = "line_endings"
"#;

    fn options() -> GroupOptions {
        GroupOptions {
            groups: vec![],
            jobs: NonZero::new(2),
            no_enforce_check: false,
            enforce_check: false,
        }
    }

    #[tokio::test]
    async fn test_only_succeeded_groups_are_written() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fmtgate.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("a.md"), "fine\r\n").unwrap();
        fs::write(dir.path().join("b.md"), "fubar\r\n").unwrap();
        fs::write(dir.path().join("c.txt"), "text\r\n").unwrap();
        let project = Project {
            cwd: dir.path().to_path_buf(),
            config_path: None,
        };

        let executed = options().execute(&project).await.unwrap();
        assert_eq!(executed.summary.state, TaskState::Failed);
        let written = write_back(&executed).unwrap();

        assert_eq!(written, vec![dir.path().join("c.txt")]);
        assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "text\n");
        // a.md passed every step, but its group failed on b.md
        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "fine\r\n");
        assert_eq!(fs::read_to_string(dir.path().join("b.md")).unwrap(), "fubar\r\n");
    }

    #[tokio::test]
    async fn test_nothing_written_when_not_enforced() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fmtgate.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("c.txt"), "text\r\n").unwrap();
        let project = Project {
            cwd: dir.path().to_path_buf(),
            config_path: None,
        };
        let mut options = options();
        options.no_enforce_check = true;

        let executed = options.execute(&project).await.unwrap();
        assert_eq!(executed.summary.state, TaskState::NoSource);
        assert!(write_back(&executed).unwrap().is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "text\r\n");
    }
}
