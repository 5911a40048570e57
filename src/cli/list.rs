use crate::{Result, files, group_options::Project};

/// Lists format groups with their steps and resolved targets
#[derive(Debug, clap::Args)]
#[clap(visible_alias = "ls")]
pub struct List {
    /// Only list these groups
    groups: Vec<String>,
}

impl List {
    pub fn run(&self, project: &Project) -> Result<()> {
        let config = project.config()?;
        let files = files::list_files(config.root())?;
        for group in config.format_groups(&self.groups, &files)? {
            println!("{}", group.name);
            for step in &group.steps {
                println!("  step   {step}");
            }
            for target in &group.targets {
                println!("  target {}", target.path.display());
            }
            for step in group.exemptions.steps() {
                println!("  ignore error for step {step}");
            }
            for pattern in group.exemptions.path_patterns() {
                println!("  ignore error for path {pattern}");
            }
        }
        Ok(())
    }
}
