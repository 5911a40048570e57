use std::sync::OnceLock;

use console::style;
use log::{Level, LevelFilter, Metadata, Record};

use crate::env;

struct Logger {
    level: LevelFilter,
    colors: bool,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("fmtgate")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = match record.level() {
            Level::Error => style("ERROR").red().bold(),
            Level::Warn => style("WARN").yellow().bold(),
            Level::Info => style("INFO").cyan(),
            Level::Debug => style("DEBUG").blue(),
            Level::Trace => style("TRACE").dim(),
        };
        let prefix = prefix.force_styling(self.colors);
        eprintln!("fmtgate {prefix} {}", record.args());
    }

    fn flush(&self) {}
}

/// Installs the stderr logger. `level` wins over `FMTGATE_LOG` when given.
pub fn init(level: Option<LevelFilter>) {
    let level = level.unwrap_or(*env::FMTGATE_LOG);
    let logger = LOGGER.get_or_init(|| Logger {
        level,
        colors: console::colors_enabled_stderr(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}
