//! bead - Command-line tool for turning images into printable bead patterns

use std::process::ExitCode;

use beadsheet::cli;

fn main() -> ExitCode {
    cli::run()
}
