use crate::{Result, group_options::Project};

/// Prints the loaded configuration
#[derive(Debug, clap::Args)]
#[clap(visible_alias = "cfg")]
pub struct Config {
    /// Output format
    #[clap(long, value_parser = ["toml", "json"], default_value = "toml")]
    format: String,
}

impl Config {
    pub fn run(&self, project: &Project) -> Result<()> {
        let config = project.config()?;
        debug!("config file: {}", config.path.display());
        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&config)?),
            _ => println!("{config}"),
        }
        Ok(())
    }
}
