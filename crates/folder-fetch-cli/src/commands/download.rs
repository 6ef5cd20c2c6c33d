use std::path::Path;

use anyhow::{Context, Result};
use folder_fetch::{Clock, ContentsApi, FetchReport, FolderFetcher, RepoLocation};

/// Mirror `location` into `<dest>/<folder name>` and print a summary.
pub async fn run<A: ContentsApi, C: Clock>(
    fetcher: &FolderFetcher<A, C>,
    location: &RepoLocation,
    dest: &Path,
) -> Result<FetchReport> {
    let root = location.local_root(dest);

    println!(
        "Downloading '{}' from {}/{} (branch '{}') into {}",
        location.path,
        location.owner,
        location.repo,
        location.branch,
        root.display()
    );

    let report = fetcher
        .fetch_folder(location, &root)
        .await
        .with_context(|| format!("failed to download {location}"))?;

    let mut summary = format!(
        "Downloaded {} files ({} bytes) into {}",
        report.files,
        report.bytes,
        root.display()
    );
    if report.skipped > 0 {
        summary.push_str(&format!(", {} entries skipped", report.skipped));
    }
    println!("{summary}");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use folder_fetch::test_support::ManualClock;
    use folder_fetch_github::{GitHubClientConfig, GitHubContentsClient};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher_for(server: &MockServer) -> FolderFetcher<GitHubContentsClient, ManualClock> {
        let client = GitHubContentsClient::new(GitHubClientConfig {
            token: None,
            api_base_url: Some(server.uri()),
        });
        FolderFetcher::with_clock(client, ManualClock::at(0))
    }

    #[tokio::test]
    async fn download_writes_under_folder_name() {
        let server = MockServer::start().await;
        let listing = format!(
            r#"[{{"name":"a.txt","path":"tools/scripts/a.txt","type":"file","download_url":"{}/raw/a.txt"}}]"#,
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/repos/o/r/contents/tools/scripts"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(listing, "application/json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("echo hi"))
            .mount(&server)
            .await;

        let dest = tempfile::tempdir().unwrap();
        let location =
            RepoLocation::parse("https://github.com/o/r/tree/main/tools/scripts").unwrap();

        let report = run(&fetcher_for(&server), &location, dest.path()).await.unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("scripts/a.txt")).unwrap(),
            "echo hi"
        );
    }

    #[tokio::test]
    async fn download_error_names_the_location() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/o/r/contents/docs"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dest = tempfile::tempdir().unwrap();
        let location = RepoLocation::new("o", "r", "nope", "docs");

        let err = run(&fetcher_for(&server), &location, dest.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("o/r@nope:docs"));
        assert!(matches!(
            err.downcast_ref::<folder_fetch::FetchError>(),
            Some(folder_fetch::FetchError::NotFound(_))
        ));
    }
}
