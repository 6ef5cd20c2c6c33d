mod commands;
mod config;
mod interactive;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use folder_fetch::{FetchOptions, FolderFetcher, Progress, RepoLocation};
use folder_fetch_github::{GitHubClientConfig, GitHubContentsClient};

use crate::config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "gh-folder-fetch", version)]
#[command(about = "Download a single folder from a GitHub repository")]
struct Cli {
    /// Folder URL: https://github.com/<owner>/<repo>/tree/<branch>/<path>.
    /// Omit to be prompted interactively.
    url: Option<String>,
    /// Destination directory (defaults to the current directory)
    #[arg(long, visible_alias = "dest-folder")]
    dest: Option<PathBuf>,
    /// GitHub personal access token (defaults to $GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,
    /// Branch to use instead of the one in the URL (for names containing '/')
    #[arg(long)]
    branch: Option<String>,
    /// List the repository's branches instead of downloading
    #[arg(long)]
    list_branches: bool,
    /// GitHub API root, e.g. https://github.example.com/api/v3
    #[arg(long)]
    api_url: Option<String>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN").ok()
}

fn parse_location(url: &str, branch: Option<String>) -> Result<RepoLocation> {
    let location = RepoLocation::parse(url)?;
    Ok(match branch {
        Some(branch) => location.with_branch(branch),
        None => location,
    })
}

fn print_progress(event: &Progress) {
    match event {
        Progress::Listing { path } => tracing::info!("listing {path}/"),
        Progress::Waiting { .. } => eprintln!("{event}"),
        _ => println!("{event}"),
    }
}

fn build_fetcher(settings: &Settings) -> FolderFetcher<GitHubContentsClient> {
    let client = GitHubContentsClient::new(GitHubClientConfig {
        token: settings.token.clone(),
        api_base_url: settings.api_base_url.clone(),
    });

    FolderFetcher::new(client)
        .options(FetchOptions {
            fallback_backoff: settings.fallback_backoff,
        })
        .on_progress(print_progress)
}

async fn run_interactive(cli: Cli) -> Result<()> {
    let answers = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        interactive::ask(&mut input, &mut std::io::stdout())?
    };

    let settings = Settings::resolve(
        Overrides {
            token: answers.token.or(cli.token),
            api_base_url: cli.api_url,
            destination: answers.destination.or(cli.dest),
        },
        github_token(),
        config::load_config(),
    );
    let location = parse_location(&answers.url, cli.branch)?;
    let fetcher = build_fetcher(&settings);

    let branches = commands::branches::run(&fetcher, &location.owner, &location.repo).await?;
    let branch = interactive::pick_branch(&location.branch, &branches)
        .with_context(|| format!("{}/{} has no branches", location.owner, location.repo))?;
    let location = location.with_branch(branch);

    commands::download::run(&fetcher, &location, &settings.destination).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let Some(url) = cli.url.clone() else {
        return run_interactive(cli).await;
    };

    let settings = Settings::resolve(
        Overrides {
            token: cli.token,
            api_base_url: cli.api_url,
            destination: cli.dest,
        },
        github_token(),
        config::load_config(),
    );
    let location = parse_location(&url, cli.branch)?;
    let fetcher = build_fetcher(&settings);

    if cli.list_branches {
        commands::branches::run(&fetcher, &location.owner, &location.repo).await?;
    } else {
        commands::download::run(&fetcher, &location, &settings.destination).await?;
    }

    Ok(())
}
