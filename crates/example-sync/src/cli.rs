//! Shared command-line entry point for both sync binaries.

use std::env;
use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::app::sync::{self, Direction};
use crate::infra::config::{SyncConfig, Workspace};

/// Exit status for wrong argument usage.
pub const USAGE_EXIT: u8 = 2;

#[derive(Debug, Parser)]
pub struct SelectorArgs {
    /// Example file, exact name, slice number, or part of a name.
    #[arg(value_name = "EXAMPLE")]
    pub token: String,
}

impl Direction {
    pub fn binary_name(self) -> &'static str {
        match self {
            Direction::ExampleToSandbox => "example-to-sandbox",
            Direction::SandboxToExample => "sandbox-to-example",
        }
    }

    fn about(self) -> &'static str {
        match self {
            Direction::ExampleToSandbox => "Copy an example's code block into the sandbox program",
            Direction::SandboxToExample => "Copy the sandbox program back into an example's code block",
        }
    }

    pub fn usage(self) -> String {
        format!(
            "Usage: {} <example name or slice number>",
            self.binary_name()
        )
    }
}

/// Parse process arguments, load configuration, and run one sync.
pub fn run(direction: Direction) -> Result<ExitCode> {
    let Some(args) = parse_args(direction, env::args_os()) else {
        println!("{}", direction.usage());
        return Ok(ExitCode::from(USAGE_EXIT));
    };

    let config = SyncConfig::load()?;
    let cwd = env::current_dir().context("failed to determine current directory")?;
    let workspace = Workspace::from_config(&config, cwd);
    tracing::debug!(?workspace, "resolved workspace");

    println!("{}", execute(direction, &workspace, &args.token)?);
    Ok(ExitCode::SUCCESS)
}

/// Run one sync against an already resolved workspace, returning the confirmation line.
pub fn execute(direction: Direction, workspace: &Workspace, token: &str) -> Result<String> {
    let report = match direction {
        Direction::ExampleToSandbox => sync::extract(workspace, token)?,
        Direction::SandboxToExample => sync::inject(workspace, token)?,
    };
    Ok(report.to_string())
}

/// Returns `None` for missing or extra arguments. Help and version requests exit directly.
fn parse_args<I, T>(direction: Direction, argv: I) -> Option<SelectorArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = SelectorArgs::command()
        .name(direction.binary_name())
        .about(direction.about());

    let parsed = command
        .try_get_matches_from(argv)
        .and_then(|matches| SelectorArgs::from_arg_matches(&matches));

    match parsed {
        Ok(args) => Some(args),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            tracing::debug!(error = %err, "argument parsing failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_token() {
        let args = parse_args(Direction::ExampleToSandbox, ["example-to-sandbox", "03"])
            .expect("parses");
        assert_eq!(args.token, "03");
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!(parse_args(Direction::SandboxToExample, ["sandbox-to-example"]).is_none());
        assert!(parse_args(Direction::SandboxToExample, ["sandbox-to-example", "1", "2"]).is_none());
    }

    #[test]
    fn usage_names_the_binary() {
        assert_eq!(
            Direction::SandboxToExample.usage(),
            "Usage: sandbox-to-example <example name or slice number>"
        );
    }
}
