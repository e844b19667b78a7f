#![forbid(unsafe_code)]

mod cli;
mod error;
mod story;

fn main() {
    if let Err(error) = cli::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
