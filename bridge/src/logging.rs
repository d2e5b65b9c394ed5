//! Tracing setup shared by the CLI and the MCP server
//!
//! Logs always go to stderr: stdout carries CLI output and, for the MCP
//! server, the protocol itself.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a binary
///
/// - `RUST_LOG`, when set, is the whole filter
/// - otherwise `<crate_name>=<default_level>` is used
/// - `LOG_FORMAT=json` switches to structured JSON lines
///
/// ```rust,ignore
/// sql_bridge::logging::init_tracing("sql_bridge", "info")?;
/// ```
pub fn init_tracing(crate_name: &str, default_level: &str) -> anyhow::Result<()> {
    let filter = build_filter(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        crate_name,
        default_level,
    )?;

    let registry = tracing_subscriber::registry().with(filter);

    if json_requested(std::env::var("LOG_FORMAT").ok().as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Map a CLI verbosity count to a level name
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn build_filter(
    rust_log: Option<&str>,
    crate_name: &str,
    default_level: &str,
) -> anyhow::Result<EnvFilter> {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => Ok(EnvFilter::try_new(directives)?),
        None => Ok(EnvFilter::try_new(format!("{}={}", crate_name, default_level))?),
    }
}

fn json_requested(value: Option<&str>) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false)
}
