use crate::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a tracing subscriber for `--trace` runs.
///
/// `log` records are forwarded through `tracing-log`, so the regular logger
/// is not installed when tracing is on.
pub fn init_tracing(json_output: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("FMTGATE_TRACE_FILTER")
        .unwrap_or_else(|_| EnvFilter::new("fmtgate=trace"));

    let result = if json_output {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_current_span(true)
            .with_span_list(false);
        let subscriber = tracing_subscriber::registry().with(filter).with(json_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_timer(fmt::time::uptime())
            .with_ansi(console::Term::stderr().features().colors_supported())
            .with_thread_ids(false)
            .with_thread_names(false)
            .compact();
        let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {e}"))?;

    if tracing_log::LogTracer::init().is_err() {
        // a logger is already installed; log records just won't show up as events
        eprintln!("Note: a logger is already installed, log records will not be traced");
    }
    Ok(())
}
