use clap::Parser;
use quantfolio::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
