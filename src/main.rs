use structopt::StructOpt;

use crate::cli::Cli;
use crate::config::Config;
use crate::engine::Engine;
use crate::kmer::KmerSet;

mod cli;
mod config;
mod engine;
mod kmer;
mod quality;
mod read;
mod scorer;
mod selector;
mod trim;
mod utils;

/// nq-filter application
///
/// Run the application from arguments provided by the command line
/// interface, printing a single `Error: ...` line and exiting 1 on any
/// fatal error. Invoking with no arguments at all is not a configuration
/// error: it displays the help text and exits 0, same as the source tool.
fn main() {
    if std::env::args().len() <= 1 {
        let mut app = Cli::clap();
        app.print_help().ok();
        println!();
        std::process::exit(0);
    }

    let args: Cli = Cli::from_args();

    let config = match Config::from_cli(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let reference = match build_reference(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let engine = Engine::new(&config, reference.as_ref());
    if let Err(e) = engine.run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn build_reference(config: &Config) -> Result<Option<KmerSet>, kmer::ReferenceError> {
    if let Some(assembly) = &config.assembly {
        return Ok(Some(KmerSet::from_assembly(assembly)?));
    }
    if let (Some(r1), Some(r2)) = (&config.reads1, &config.reads2) {
        return Ok(Some(KmerSet::from_read_pair(r1, r2)?));
    }
    Ok(None)
}
