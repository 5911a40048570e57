use eyre::{WrapErr, bail};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    Result, env,
    error::Error,
    exemption::ExemptionPolicy,
    format_group::FormatGroup,
    glob::{self, MatchOptions},
    step::builtin::StepConfig,
    target::Target,
};

const CONFIG_FILENAMES: &[&str] = &[
    "fmtgate.toml",
    ".config/fmtgate.toml",
    "fmtgate.yaml",
    "fmtgate.yml",
    "fmtgate.json",
];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct Config {
    /// When false, no group runs and the task ends as NO-SOURCE.
    #[serde(default = "default_true")]
    pub enforce_check: bool,
    /// Matching rules shared by `target` and `ignore_error_for_path`.
    #[serde(default, rename = "match")]
    pub matching: MatchOptions,
    #[serde(default)]
    pub groups: IndexMap<String, GroupConfig>,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct GroupConfig {
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default)]
    pub target_exclude: Vec<String>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
    #[serde(default)]
    pub ignore_error_for_step: Vec<String>,
    #[serde(default)]
    pub ignore_error_for_path: Vec<String>,
    pub enforce_check: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enforce_check: true,
            matching: MatchOptions::default(),
            groups: IndexMap::new(),
            path: PathBuf::new(),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = toml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{s}")
    }
}

impl Config {
    /// Finds the nearest config file at or above `cwd`, or the one named by `FMTGATE_FILE`.
    #[tracing::instrument(level = "info", name = "config.load")]
    pub fn get(cwd: &Path) -> Result<Self> {
        let path = match env::FMTGATE_FILE.as_ref() {
            Some(path) => cwd.join(path),
            None => match Self::find(cwd) {
                Some(path) => path,
                None => bail!(
                    "no config file found in {} or its parents (looked for {})",
                    cwd.display(),
                    CONFIG_FILENAMES.join(", ")
                ),
            },
        };
        Self::read(&path).wrap_err_with(|| format!("Failed to read config file: {}", path.display()))
    }

    fn find(cwd: &Path) -> Option<PathBuf> {
        cwd.ancestors()
            .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.exists())
    }

    #[tracing::instrument(level = "info", name = "config.read", skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<Self> {
        let ext = path.extension().unwrap_or_default().to_string_lossy();
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = match ext.as_ref() {
            "toml" => toml::from_str(&raw)?,
            "yaml" | "yml" => serde_yaml::from_str(&raw)?,
            "json" => serde_json::from_str(&raw)?,
            _ => return Err(Error::UnsupportedConfigFormat(path.to_path_buf()).into()),
        };
        config.path = path.to_path_buf();
        config.validate()?;
        debug!("loaded {} groups from {}", config.groups.len(), path.display());
        Ok(config)
    }

    /// The directory target paths are relative to.
    pub fn root(&self) -> &Path {
        // a bare relative file name has "" as its parent
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        // .config/fmtgate.toml belongs to the project above it
        if dir.file_name().is_some_and(|n| n == ".config") {
            match dir.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            }
        } else {
            dir
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (group_name, group) in &self.groups {
            let mut seen = IndexSet::new();
            for step in &group.steps {
                if !seen.insert(step.name()) {
                    return Err(Error::DuplicateStep {
                        group: group_name.clone(),
                        step: step.name().to_string(),
                    }
                    .into());
                }
            }
            glob::compile_all(&group.target, &self.matching)
                .and_then(|_| glob::compile_all(&group.target_exclude, &self.matching))
                .and_then(|_| glob::compile_all(&group.ignore_error_for_path, &self.matching))
                .wrap_err_with(|| format!("group '{group_name}'"))?;
        }
        Ok(())
    }

    /// Restricts the config to `names`, keeping declared order. Empty means all.
    pub fn select(&self, names: &[String]) -> Result<Vec<(&String, &GroupConfig)>> {
        if let Some(unknown) = names.iter().find(|n| !self.groups.contains_key(*n)) {
            return Err(Error::UnknownGroup(unknown.clone()).into());
        }
        Ok(self
            .groups
            .iter()
            .filter(|(name, _)| names.is_empty() || names.contains(name))
            .collect())
    }

    /// Builds runnable groups, resolving targets from `files` (relative to [`root`](Self::root)).
    pub fn format_groups(&self, names: &[String], files: &[PathBuf]) -> Result<Vec<FormatGroup>> {
        self.select(names)?
            .into_iter()
            .map(|(name, group)| {
                self.build_group(name, group, files)
                    .wrap_err_with(|| format!("failed to build group '{name}'"))
            })
            .collect()
    }

    fn build_group(&self, name: &str, config: &GroupConfig, files: &[PathBuf]) -> Result<FormatGroup> {
        let mut group = FormatGroup::new(name).with_exemptions(ExemptionPolicy::new(
            config.ignore_error_for_step.iter().cloned(),
            config.ignore_error_for_path.iter().cloned(),
            self.matching,
        )?);
        group.enforce_check = config.enforce_check;
        for step in &config.steps {
            group = group.with_step(step.build()?)?;
        }
        let include = glob::compile_all(&config.target, &self.matching)?;
        let exclude = glob::compile_all(&config.target_exclude, &self.matching)?;
        let excluded = glob::get_matches(&exclude, files);
        for path in glob::get_matches(&include, files) {
            if excluded.contains(&path) {
                continue;
            }
            let target = Target::read(self.root(), &path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            group = group.with_target(target);
        }
        debug!("{name}: {} steps, {} targets", group.steps.len(), group.targets.len());
        Ok(group)
    }
}
