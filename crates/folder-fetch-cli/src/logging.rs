//! Log output to stderr, optionally mirrored to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

/// Crates whose events are shown at the chosen verbosity. Everything else
/// (hyper, reqwest) stays at `warn` unless `RUST_LOG` says otherwise.
const OUR_TARGETS: &[&str] = &["gh_folder_fetch", "folder_fetch", "folder_fetch_github"];

/// Map `-v` occurrences to a level name.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Default filter directive for a verbosity.
pub fn default_directive(verbosity: u8) -> String {
    let level = level_for(verbosity);
    let mut directive = String::from("warn");
    for target in OUR_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Initialize logging. `RUST_LOG` overrides the verbosity-derived filter.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .try_init()
        .ok();

    Ok(())
}
