//! usprop-cli
//!
//! Shared pieces of the `usprop-prepare` and `usprop-chat` binaries: logging
//! setup, config-driven path resolution and the interactive chat session.

pub mod session;

pub use session::ChatSession;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use usprop_core::config::resolve_with_base;

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// A CLI override wins over the configured value; both resolve against the
/// working directory.
pub fn pick_path(cli: Option<PathBuf>, configured: &str) -> anyhow::Result<PathBuf> {
    let base = std::env::current_dir()?;
    Ok(match cli {
        Some(p) => resolve_with_base(&base, p.to_string_lossy()),
        None => resolve_with_base(&base, configured),
    })
}
