use folder_fetch::{EntryKind, TreeEntry};
use serde::Deserialize;

/// Response from GitHub's Contents API.
/// `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`
///
/// A folder path yields an array; a file path yields a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentsResponse {
    Folder(Vec<ContentEntry>),
    Single(ContentEntry),
}

/// One record of a contents listing.
#[derive(Debug, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub download_url: Option<String>,
}

impl ContentsResponse {
    pub fn into_entries(self) -> Vec<TreeEntry> {
        let records = match self {
            Self::Folder(records) => records,
            Self::Single(record) => vec![record],
        };

        records.into_iter().map(ContentEntry::into_entry).collect()
    }
}

impl ContentEntry {
    pub fn into_entry(self) -> TreeEntry {
        TreeEntry {
            kind: EntryKind::parse(&self.entry_type),
            name: self.name,
            path: self.path,
            download_url: self.download_url,
        }
    }
}
