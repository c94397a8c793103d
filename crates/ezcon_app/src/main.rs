use clap::Parser;

mod cli;
mod commands;
mod platform;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log.into(), cli.verbose);

    match commands::dispatch(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
