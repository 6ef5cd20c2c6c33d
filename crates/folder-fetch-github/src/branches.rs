use serde::Deserialize;

/// One record from `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Deserialize)]
pub struct BranchEntry {
    pub name: String,
}

