//! Resolving a selector token to a single example document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use once_cell::unsync::OnceCell;

use crate::domain::errors::{AmbiguousRule, IoAction, SyncError};
use crate::domain::model::{ExampleDocument, file_name_of};
use crate::infra::config::Workspace;

/// Lookup rules, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The token is itself a path to an existing document.
    ExplicitPath,
    /// `<token>.<ext>` exists in the documents directory.
    ExactStem,
    /// Numeric token matched against `NN_` or `N_` filename prefixes.
    SliceIndex,
    /// Case-insensitive substring of a document stem, with `-` read as `_`.
    Substring,
}

impl Rule {
    const CHAIN: [Rule; 4] = [
        Rule::ExplicitPath,
        Rule::ExactStem,
        Rule::SliceIndex,
        Rule::Substring,
    ];

    fn ambiguity(self) -> AmbiguousRule {
        match self {
            Rule::SliceIndex => AmbiguousRule::Slice,
            _ => AmbiguousRule::Substring,
        }
    }
}

/// A token successfully resolved to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    pub rule: Rule,
}

/// Resolve `token` to exactly one document in the workspace.
pub fn resolve(workspace: &Workspace, token: &str) -> Result<Resolution, SyncError> {
    let resolver = Resolver::new(workspace);

    for rule in Rule::CHAIN {
        let mut matches = resolver.candidates(rule, token)?;
        tracing::debug!(token, ?rule, count = matches.len(), "resolver stage");

        match matches.len() {
            0 => continue,
            1 => {
                let path = matches.remove(0);
                tracing::debug!(token, ?rule, path = %path.display(), "resolved example");
                return Ok(Resolution { path, rule });
            }
            _ => {
                return Err(SyncError::Ambiguous {
                    token: token.to_owned(),
                    rule: rule.ambiguity(),
                    matches: matches.iter().map(|path| file_name_of(path)).collect(),
                });
            }
        }
    }

    Err(SyncError::NotFound {
        token: token.to_owned(),
    })
}

/// Every document in the workspace's documents directory, sorted by file name.
///
/// A missing documents directory yields an empty list.
pub fn list_examples(workspace: &Workspace) -> Result<Vec<ExampleDocument>, SyncError> {
    let pattern = document_matcher(&workspace.extension)?;
    Ok(list_documents(&workspace.docs_dir, &pattern)?
        .into_iter()
        .filter_map(ExampleDocument::from_path)
        .collect())
}

struct Resolver<'a> {
    workspace: &'a Workspace,
    /// Listed on first use; the path rules never read the directory.
    documents: OnceCell<Vec<ExampleDocument>>,
}

impl<'a> Resolver<'a> {
    fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            documents: OnceCell::new(),
        }
    }

    fn documents(&self) -> Result<&[ExampleDocument], SyncError> {
        self.documents
            .get_or_try_init(|| list_examples(self.workspace))
            .map(Vec::as_slice)
    }

    fn candidates(&self, rule: Rule, token: &str) -> Result<Vec<PathBuf>, SyncError> {
        match rule {
            Rule::ExplicitPath => Ok(self.explicit_path(token)),
            Rule::ExactStem => Ok(self.exact_stem(token)),
            Rule::SliceIndex => self.slice_index(token),
            Rule::Substring => self.substring(token),
        }
    }

    fn explicit_path(&self, token: &str) -> Vec<PathBuf> {
        let candidate = Path::new(token);
        let has_extension = candidate
            .extension()
            .is_some_and(|ext| ext == self.workspace.extension.as_str());
        if has_extension && candidate.is_file() {
            vec![candidate.to_path_buf()]
        } else {
            Vec::new()
        }
    }

    fn exact_stem(&self, token: &str) -> Vec<PathBuf> {
        if token.is_empty() {
            return Vec::new();
        }
        let path = self
            .workspace
            .docs_dir
            .join(format!("{token}.{}", self.workspace.extension));
        if path.is_file() { vec![path] } else { Vec::new() }
    }

    fn slice_index(&self, token: &str) -> Result<Vec<PathBuf>, SyncError> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Vec::new());
        }
        let Ok(index) = token.parse::<u64>() else {
            return Ok(Vec::new());
        };

        let prefixes = [format!("{index:02}_"), format!("{index}_")];
        Ok(self
            .documents()?
            .iter()
            .filter(|doc| {
                let name = doc.file_name();
                prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
            })
            .map(|doc| doc.path.clone())
            .collect())
    }

    fn substring(&self, token: &str) -> Result<Vec<PathBuf>, SyncError> {
        let needle = token.to_lowercase().replace('-', "_");
        Ok(self
            .documents()?
            .iter()
            .filter(|doc| doc.stem.to_lowercase().contains(&needle))
            .map(|doc| doc.path.clone())
            .collect())
    }
}

fn document_matcher(extension: &str) -> Result<GlobMatcher, SyncError> {
    Glob::new(&format!("*.{extension}"))
        .map(|glob| glob.compile_matcher())
        .map_err(|source| SyncError::InvalidExtension {
            extension: extension.to_owned(),
            source,
        })
}

fn list_documents(dir: &Path, pattern: &GlobMatcher) -> Result<Vec<PathBuf>, SyncError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "documents directory missing");
            return Ok(Vec::new());
        }
        Err(err) => return Err(SyncError::io(IoAction::List, dir, err)),
    };

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SyncError::io(IoAction::List, dir, err))?;
        let path = entry.path();
        if path.is_file() && pattern.is_match(entry.file_name()) {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}
