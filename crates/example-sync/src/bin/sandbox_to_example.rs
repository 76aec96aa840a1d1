use std::process::ExitCode;

use example_sync::Direction;

fn main() -> anyhow::Result<ExitCode> {
    example_sync::init();

    example_sync::cli::run(Direction::SandboxToExample)
}
