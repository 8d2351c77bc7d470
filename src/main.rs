use std::process;

use clap::Parser;
use log::LevelFilter;

use icmptab::cli::Args;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match icmptab::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
