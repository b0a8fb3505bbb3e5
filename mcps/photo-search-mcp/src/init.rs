//! Tracing setup for the server binary
//!
//! Logs go to stderr since stdout carries the MCP protocol. `RUST_LOG`
//! refines the default `photo_search_mcp=info` filter and `LOG_FORMAT=json`
//! switches to structured output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "photo_search_mcp=info";

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Install the global subscriber; call once at startup
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(DEFAULT_DIRECTIVE.parse()?);
    let format = std::env::var("LOG_FORMAT").ok();
    let registry = tracing_subscriber::registry().with(filter);

    if wants_json(format.as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
