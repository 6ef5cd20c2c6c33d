use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised while parsing a GitHub folder URL.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocationError {
    #[error(
        "invalid URL {0:?}: expected https://github.com/<owner>/<repo>/tree/<branch>/<folder>"
    )]
    InvalidUrl(String),
}

/// A folder inside a GitHub repository at a given branch.
///
/// `path` is relative to the repository root and never carries leading or
/// trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl RepoLocation {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            path: path.into().trim_matches('/').to_owned(),
        }
    }

    /// Parse a folder URL of the form
    /// `https://github.com/<owner>/<repo>/tree/<branch>/<path>`.
    ///
    /// The branch is taken to be the single segment after `tree`; branch
    /// names containing `/` must be supplied separately via [`with_branch`].
    ///
    /// [`with_branch`]: RepoLocation::with_branch
    pub fn parse(url: &str) -> Result<Self, LocationError> {
        let invalid = || LocationError::InvalidUrl(url.to_owned());

        let trimmed = url.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(invalid)?;

        let rest = without_scheme
            .strip_prefix("github.com/")
            .or_else(|| without_scheme.strip_prefix("www.github.com/"))
            .ok_or_else(invalid)?;

        // Query strings and fragments are not part of the folder path
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        // GitHub percent-encodes names in its URLs; the API client encodes again
        let decoded = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let segments: Vec<&str> = decoded.iter().map(|s| s.as_ref()).collect();

        match segments.as_slice() {
            [owner, repo, "tree", branch, path @ ..] if !path.is_empty() => Ok(Self {
                owner: (*owner).to_owned(),
                repo: repo.trim_end_matches(".git").to_owned(),
                branch: (*branch).to_owned(),
                path: path.join("/"),
            }),
            _ => Err(invalid()),
        }
    }

    /// Same location on a different branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Location of a direct child of this folder.
    pub fn child(&self, name: &str) -> Self {
        let path = if self.path.is_empty() {
            name.to_owned()
        } else {
            format!("{}/{name}", self.path)
        };

        Self {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            path,
        }
    }

    /// Final segment of the folder path, or the repository name for the root.
    pub fn folder_name(&self) -> &str {
        self.path
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.repo)
    }

    /// Local directory this folder is mirrored into: `<dest>/<folder name>`.
    pub fn local_root(&self, dest: &Path) -> PathBuf {
        dest.join(self.folder_name())
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}:{}",
            self.owner, self.repo, self.branch, self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_folder_url() {
        let loc = RepoLocation::parse("https://github.com/octocat/Hello-World/tree/master/docs")
            .unwrap();
        assert_eq!(loc, RepoLocation::new("octocat", "Hello-World", "master", "docs"));
    }

    #[test]
    fn parses_nested_folder_path() {
        let loc =
            RepoLocation::parse("https://github.com/owner/repo/tree/main/src/bin/tools").unwrap();
        assert_eq!(loc.branch, "main");
        assert_eq!(loc.path, "src/bin/tools");
        assert_eq!(loc.folder_name(), "tools");
    }

    #[test]
    fn tolerates_trailing_slash_query_and_fragment() {
        let loc =
            RepoLocation::parse("https://github.com/owner/repo/tree/dev/docs/?tab=readme#top")
                .unwrap();
        assert_eq!(loc.path, "docs");
        assert_eq!(loc.branch, "dev");
    }

    #[test]
    fn decodes_percent_encoded_segments() {
        let loc =
            RepoLocation::parse("https://github.com/o/r/tree/release%2D1/my%20docs/%C3%A9t%C3%A9")
                .unwrap();
        assert_eq!(loc.branch, "release-1");
        assert_eq!(loc.path, "my docs/été");
        assert_eq!(loc.folder_name(), "été");
    }

    #[test]
    fn rejects_segments_that_are_not_utf8() {
        let result = RepoLocation::parse("https://github.com/o/r/tree/main/%FF");
        assert!(matches!(result, Err(LocationError::InvalidUrl(_))));
    }

    #[test]
    fn accepts_http_and_www_host() {
        let loc = RepoLocation::parse("http://www.github.com/owner/repo/tree/main/a").unwrap();
        assert_eq!(loc.owner, "owner");
        assert_eq!(loc.repo, "repo");
    }

    #[test]
    fn rejects_blob_urls() {
        let result = RepoLocation::parse("https://github.com/owner/repo/blob/main/README.md");
        assert!(matches!(result, Err(LocationError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_url_without_folder() {
        assert!(RepoLocation::parse("https://github.com/owner/repo/tree/main").is_err());
        assert!(RepoLocation::parse("https://github.com/owner/repo").is_err());
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(RepoLocation::parse("https://gitlab.com/owner/repo/tree/main/docs").is_err());
        assert!(RepoLocation::parse("github.com/owner/repo/tree/main/docs").is_err());
    }

    #[test]
    fn child_extends_path() {
        let loc = RepoLocation::new("o", "r", "main", "docs");
        let child = loc.child("sub");
        assert_eq!(child.path, "docs/sub");
        assert_eq!(child.branch, "main");

        let root = RepoLocation::new("o", "r", "main", "");
        assert_eq!(root.child("docs").path, "docs");
    }

    #[test]
    fn with_branch_overrides_parsed_branch() {
        let loc = RepoLocation::parse("https://github.com/o/r/tree/feature/docs")
            .unwrap()
            .with_branch("feature/new-docs");
        assert_eq!(loc.branch, "feature/new-docs");
    }

    #[test]
    fn folder_name_falls_back_to_repo_for_root() {
        let loc = RepoLocation::new("o", "my-repo", "main", "/");
        assert_eq!(loc.folder_name(), "my-repo");
    }

    #[test]
    fn local_root_appends_folder_name() {
        let loc = RepoLocation::parse("https://github.com/o/r/tree/main/src/docs").unwrap();
        assert_eq!(
            loc.local_root(Path::new("/tmp/out")),
            PathBuf::from("/tmp/out/docs")
        );
    }
}
