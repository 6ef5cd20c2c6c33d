use std::fmt;

/// Classification of a contents-listing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything else we do not materialize.
    Other,
}

impl EntryKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "file" => Self::File,
            "dir" => Self::Dir,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Dir => write!(f, "dir"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One file or directory record returned by a contents listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Final path segment.
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    pub kind: EntryKind,
    /// Raw-content URL; only present for files.
    pub download_url: Option<String>,
}

impl TreeEntry {
    pub fn file(path: &str, download_url: impl Into<String>) -> Self {
        Self {
            name: last_segment(path).to_owned(),
            path: path.to_owned(),
            kind: EntryKind::File,
            download_url: Some(download_url.into()),
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            name: last_segment(path).to_owned(),
            path: path.to_owned(),
            kind: EntryKind::Dir,
            download_url: None,
        }
    }

    /// True if `name` can be used as a single local path component.
    ///
    /// Rejects empty names, `.` and `..`, and anything containing a path
    /// separator, so an entry can never escape its destination directory.
    pub fn has_safe_name(&self) -> bool {
        !self.name.is_empty()
            && self.name != "."
            && self.name != ".."
            && !self.name.contains(['/', '\\'])
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_api_type_strings() {
        assert_eq!(EntryKind::parse("file"), EntryKind::File);
        assert_eq!(EntryKind::parse("dir"), EntryKind::Dir);
        assert_eq!(EntryKind::parse("symlink"), EntryKind::Other);
        assert_eq!(EntryKind::parse("submodule"), EntryKind::Other);
    }

    #[test]
    fn constructors_derive_name_from_path() {
        let file = TreeEntry::file("docs/sub/b.txt", "https://raw.example/b.txt");
        assert_eq!(file.name, "b.txt");
        assert_eq!(file.kind, EntryKind::File);

        let dir = TreeEntry::dir("docs/sub");
        assert_eq!(dir.name, "sub");
        assert!(dir.download_url.is_none());
    }

    #[test]
    fn safe_name_rejects_traversal() {
        let mut entry = TreeEntry::dir("docs/sub");
        assert!(entry.has_safe_name());

        for bad in ["", ".", "..", "a/b", "..\\evil"] {
            entry.name = bad.to_owned();
            assert!(!entry.has_safe_name(), "{bad:?} should be rejected");
        }
    }
}
