//! Copying the code block between an example document and the sandbox program.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::fence;
use crate::app::resolve::resolve;
use crate::domain::errors::{IoAction, SyncError};
use crate::infra::config::Workspace;

/// Which way a sync run copied code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Example document block → sandbox program.
    ExampleToSandbox,
    /// Sandbox program → example document block.
    SandboxToExample,
}

/// Outcome of a successful sync, rendered as the confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub direction: Direction,
    pub document: PathBuf,
    /// Document path relative to the workspace root, when it lives inside it.
    pub display_path: String,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::ExampleToSandbox => {
                write!(f, "Wrote sandbox program from {}", self.display_path)
            }
            Direction::SandboxToExample => {
                write!(f, "Updated {} from sandbox program", self.display_path)
            }
        }
    }
}

/// Copy the document's code block into the sandbox program, replacing it wholesale.
pub fn extract(workspace: &Workspace, token: &str) -> Result<SyncReport, SyncError> {
    let document = resolve(workspace, token)?.path;
    let text = read_text(&document)?;

    let code = fence::extract_code(&text, &workspace.language).ok_or_else(|| {
        SyncError::MissingCodeBlock {
            language: workspace.language.clone(),
            path: document.clone(),
        }
    })?;

    write_text(&workspace.sandbox_file, &code)?;
    tracing::debug!(
        document = %document.display(),
        sandbox = %workspace.sandbox_file.display(),
        bytes = code.len(),
        "extracted code block"
    );

    Ok(report(workspace, Direction::ExampleToSandbox, document))
}

/// Replace the document's code block with the sandbox program.
pub fn inject(workspace: &Workspace, token: &str) -> Result<SyncReport, SyncError> {
    let document = resolve(workspace, token)?.path;
    let code = read_text(&workspace.sandbox_file)?;
    let text = read_text(&document)?;

    let updated = fence::replace_code(&text, &workspace.language, &code).ok_or_else(|| {
        SyncError::MissingCodeBlock {
            language: workspace.language.clone(),
            path: document.clone(),
        }
    })?;

    write_text(&document, &updated)?;
    tracing::debug!(
        document = %document.display(),
        sandbox = %workspace.sandbox_file.display(),
        "injected sandbox program"
    );

    Ok(report(workspace, Direction::SandboxToExample, document))
}

fn report(workspace: &Workspace, direction: Direction, document: PathBuf) -> SyncReport {
    SyncReport {
        direction,
        display_path: workspace.display_path(&document),
        document,
    }
}

fn read_text(path: &Path) -> Result<String, SyncError> {
    fs::read_to_string(path).map_err(|err| SyncError::io(IoAction::Read, path, err))
}

fn write_text(path: &Path, contents: &str) -> Result<(), SyncError> {
    fs::write(path, contents).map_err(|err| SyncError::io(IoAction::Write, path, err))
}
