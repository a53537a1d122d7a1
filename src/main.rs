use std::process;

fn main() {
    process::exit(runfile::cli::run());
}
