use bytelox::cli::{Cli, repl, run_file};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let status = if let Some(file_path) = cli.file {
        run_file(&file_path, cli.trace)
    } else {
        repl(cli.trace);
        0
    };

    std::process::exit(status);
}
