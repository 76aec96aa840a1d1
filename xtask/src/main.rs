use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use example_sync::app::{fence, resolve};
use example_sync::{SyncConfig, Workspace};

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Verify every example document carries a code block for the sandbox
    CheckExamples {
        /// Repository root; defaults to the configured or discovered root
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::CheckExamples { root } => check_examples(root)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn check_examples(root: Option<PathBuf>) -> Result<()> {
    let config = SyncConfig::load_for_root(root)?;
    let cwd = std::env::current_dir()?;
    let workspace = Workspace::from_config(&config, cwd);

    let report = check_workspace(&workspace)?;
    for line in &report.lines {
        println!("{line}");
    }
    println!(
        "checked {} example(s) in {}",
        report.checked,
        workspace.display_path(&workspace.docs_dir)
    );
    Ok(())
}

struct CheckReport {
    checked: usize,
    lines: Vec<String>,
}

fn check_workspace(workspace: &Workspace) -> Result<CheckReport> {
    let documents = resolve::list_examples(workspace)?;
    if documents.is_empty() {
        anyhow::bail!(
            "no examples found in {}",
            workspace.display_path(&workspace.docs_dir)
        );
    }

    let mut lines = Vec::new();
    let mut missing = Vec::new();
    for doc in &documents {
        let text = std::fs::read_to_string(&doc.path)
            .with_context(|| format!("failed to read {}", doc.path.display()))?;
        let has_block = fence::find_block(&text, &workspace.language).is_some();
        let slice = doc
            .index
            .map(|index| format!("{index:>3}"))
            .unwrap_or_else(|| "  -".to_owned());
        let status = if has_block { "ok" } else { "missing block" };
        lines.push(format!("{slice}  {:<32} {status}", doc.slug));
        if !has_block {
            missing.push(doc.file_name());
        }
    }

    if !missing.is_empty() {
        anyhow::bail!(
            "examples without a {} block: {}",
            workspace.language,
            missing.join(", ")
        );
    }
    Ok(CheckReport {
        checked: documents.len(),
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn workspace_with(docs: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
        let temp = tempfile::tempdir().expect("tempdir");
        let workspace = Workspace::new(temp.path());
        fs::create_dir_all(&workspace.docs_dir).expect("docs dir");
        for (name, body) in docs {
            fs::write(workspace.docs_dir.join(name), body).expect("write doc");
        }
        (temp, workspace)
    }

    #[test]
    fn reports_slice_and_slug_for_each_example() -> Result<()> {
        let (_temp, ws) = workspace_with(&[
            ("01_hello.md", "```csharp\nvar x = 1;\n```\n"),
            ("intro.md", "```csharp\n```\n"),
        ]);
        let report = check_workspace(&ws)?;
        assert_eq!(report.checked, 2);
        assert!(report.lines[0].starts_with("  1  hello"));
        assert!(report.lines[1].starts_with("  -  intro"));
        assert!(report.lines.iter().all(|line| line.ends_with("ok")));
        Ok(())
    }

    #[test]
    fn fails_when_a_block_is_missing() {
        let (_temp, ws) = workspace_with(&[
            ("01_hello.md", "```csharp\nvar x = 1;\n```\n"),
            ("02_prose.md", "just words\n"),
        ]);
        let err = check_workspace(&ws).err().expect("missing block fails");
        assert_eq!(
            err.to_string(),
            "examples without a csharp block: 02_prose.md"
        );
    }

    #[test]
    fn fails_when_no_examples_exist() {
        let (_temp, ws) = workspace_with(&[]);
        let err = check_workspace(&ws).err().expect("empty docs dir fails");
        assert!(err.to_string().starts_with("no examples found in"));
    }
}
