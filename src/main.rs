use std::env;

use env_logger::Env;

use warboard::cli::run_with_args;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(run_with_args(&args));
}
