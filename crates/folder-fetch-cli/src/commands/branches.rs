use anyhow::{Context, Result};
use folder_fetch::{Clock, ContentsApi, FolderFetcher};

/// Print every branch of `owner/repo`, one per line.
pub async fn run<A: ContentsApi, C: Clock>(
    fetcher: &FolderFetcher<A, C>,
    owner: &str,
    repo: &str,
) -> Result<Vec<String>> {
    let branches = fetcher
        .list_branches(owner, repo)
        .await
        .with_context(|| format!("failed to list branches of {owner}/{repo}"))?;

    println!("Available branches for {owner}/{repo}:");
    for branch in &branches {
        println!("  {branch}");
    }

    Ok(branches)
}
