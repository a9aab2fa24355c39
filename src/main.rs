use arrangify::cli::{Cli, run_cli};
use arrangify::logging;
use arrangify::output::OutputFormatter;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    logging::init_logger();

    if let Err(e) = run_cli(cli) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
