use std::path::Path;
use std::process::{Command, Output};

use itertools::Itertools as _;

/// Runs one external command to completion and hands back what it printed.
///
/// The inquirer only ever talks to the outside world through this, so tests can swap in a runner
/// that replays canned `sacct` output.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<Output>;
}

/// Spawns the real process, blocking until it exits. No timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

/// Shell-ish rendering of a command line for logs and error messages.
pub fn display_command(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string()).chain(args.iter().cloned()).join(" ")
}
