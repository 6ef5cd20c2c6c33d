use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// What the user typed at the interactive prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub url: String,
    pub destination: Option<PathBuf>,
    pub token: Option<String>,
}

/// Ask for the folder URL, destination and token. Blank answers for the
/// optional questions mean "use the default".
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Answers> {
    let url = prompt(input, output, "GitHub folder URL: ")?;
    if url.is_empty() {
        bail!("a GitHub folder URL is required");
    }

    let destination = prompt(
        input,
        output,
        "Destination folder (blank for current directory): ",
    )?;
    let token = prompt(input, output, "GitHub token (blank to skip): ")?;

    Ok(Answers {
        url,
        destination: (!destination.is_empty()).then(|| PathBuf::from(destination)),
        token: (!token.is_empty()).then_some(token),
    })
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{label}")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read from standard input")?;

    Ok(line.trim().to_owned())
}

/// Keep `requested` if the repository has it, otherwise fall back to the
/// first available branch. Returns `None` when the repository has no branches.
pub fn pick_branch(requested: &str, available: &[String]) -> Option<String> {
    if available.iter().any(|b| b == requested) {
        return Some(requested.to_owned());
    }

    let fallback = available.first()?;
    tracing::warn!("branch '{requested}' not found; defaulting to '{fallback}'");
    Some(fallback.clone())
}
