//! Domain models for example documents.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

static INDEXED_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_(.*)$").expect("valid stem pattern"));

/// A markdown example living in the documents directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDocument {
    pub path: PathBuf,
    pub stem: String,
    /// Numeric slice prefix, when the stem follows `<index>_<slug>`.
    pub index: Option<u32>,
    pub slug: String,
}

impl ExampleDocument {
    /// Build a document from its path. Returns `None` when the path has no UTF-8 file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let stem = path.file_stem()?.to_str()?.to_owned();

        let (index, slug) = match INDEXED_STEM.captures(&stem) {
            Some(caps) => (caps[1].parse().ok(), caps[2].to_owned()),
            None => (None, stem.clone()),
        };

        Some(Self {
            path,
            stem,
            index,
            slug,
        })
    }

    /// File name used in messages, e.g. `01_hello.md`.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_index_and_slug() {
        let doc = ExampleDocument::from_path("docs/examples/07_locked_door.md").unwrap();
        assert_eq!(doc.stem, "07_locked_door");
        assert_eq!(doc.index, Some(7));
        assert_eq!(doc.slug, "locked_door");
        assert_eq!(doc.file_name(), "07_locked_door.md");
    }

    #[test]
    fn stem_without_prefix_is_all_slug() {
        let doc = ExampleDocument::from_path("docs/examples/readme.md").unwrap();
        assert_eq!(doc.index, None);
        assert_eq!(doc.slug, "readme");
    }
}
