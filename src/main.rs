use std::process::ExitCode;

use clap::Parser;
use tenantctl::cli;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            println!("FAILED");
            ExitCode::FAILURE
        }
    }
}
