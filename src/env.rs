pub use std::env::*;
use std::{num::NonZero, path::PathBuf, sync::LazyLock};

pub static FMTGATE_FILE: LazyLock<Option<PathBuf>> = LazyLock::new(|| var_path("FMTGATE_FILE"));
pub static FMTGATE_LOG: LazyLock<log::LevelFilter> = LazyLock::new(|| {
    var_log_level("FMTGATE_LOG")
        .or(var_log_level("FMTGATE_LOG_LEVEL"))
        .unwrap_or(log::LevelFilter::Info)
});
pub static FMTGATE_JOBS: LazyLock<Option<NonZero<usize>>> =
    LazyLock::new(|| var("FMTGATE_JOBS").ok().and_then(|v| v.trim().parse().ok()));

// Overrides the config file's enforce_check when set to a true/false value
pub static FMTGATE_ENFORCE_CHECK: LazyLock<Option<bool>> = LazyLock::new(|| {
    if var_true("FMTGATE_ENFORCE_CHECK") {
        Some(true)
    } else if var_false("FMTGATE_ENFORCE_CHECK") {
        Some(false)
    } else {
        None
    }
});

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TraceMode {
    Off,
    Text,
    Json,
}

pub static FMTGATE_TRACE: LazyLock<TraceMode> =
    LazyLock::new(|| match var("FMTGATE_TRACE").map(|v| v.to_lowercase()) {
        Ok(v) if v == "json" => TraceMode::Json,
        Ok(v) if v == "1" || v == "true" => TraceMode::Text,
        _ => TraceMode::Off,
    });

fn var_path(name: &str) -> Option<PathBuf> {
    var(name).map(PathBuf::from).ok()
}

fn var_log_level(name: &str) -> Option<log::LevelFilter> {
    var(name).ok().and_then(|level| level.parse().ok())
}

fn var_true(name: &str) -> bool {
    var(name)
        .map(|val| val.to_lowercase())
        .map(|val| val == "true" || val == "1")
        .unwrap_or(false)
}

fn var_false(name: &str) -> bool {
    var(name)
        .map(|val| val.to_lowercase())
        .map(|val| val == "false" || val == "0")
        .unwrap_or(false)
}
