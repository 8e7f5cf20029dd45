// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains the implementation of the `blockerr` binary.

use blockerr::{input::Estimation, BLOCKERR_VERSION};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Estimate statistical errors of time-correlated observables using block averaging."
)]
pub struct Args {
    #[arg(
        help = "Config yaml file",
        long_help = "Configuration yaml file specifying the estimation settings."
    )]
    pub config: String,

    #[arg(
        long = "silent",
        help = "Print nothing to standard output",
        long_help = "Do not print anything to standard output. Errors are still reported. Overrides the config file."
    )]
    pub silent: bool,

    #[arg(
        long = "overwrite",
        help = "Do not back up output files",
        long_help = "Overwrite existing output files instead of backing them up. Overrides the config file."
    )]
    pub overwrite: bool,
}

pub(crate) fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut estimation = match Estimation::from_file(&args.config) {
        Ok(x) => x,
        Err(e) => {
            colog::basic_builder()
                .filter(None, log::LevelFilter::Error)
                .init();
            log::error!("{}", e);
            return Err(Box::from(e));
        }
    };

    if args.silent {
        estimation.set_silent(true);
    }

    if args.overwrite {
        estimation.set_overwrite(true);
    }

    if estimation.silent() {
        colog::basic_builder()
            .filter(None, log::LevelFilter::Error)
            .init();
    } else {
        colog::init();
        let header = format!(">>> BLOCKERR v{} <<<", BLOCKERR_VERSION).bold();
        println!("\n{}\n", header);
        log::info!("Read config file '{}'.", args.config);
    }

    let result = estimation.run();

    if let Err(e) = &result {
        log::error!("{}", e);
    }

    if !estimation.silent() {
        match &result {
            Ok(_) => {
                let prefix = format!(
                    "{}{}{}",
                    "[".to_string().blue().bold(),
                    "✔".to_string().bright_green().bold(),
                    "]".to_string().blue().bold()
                );
                let message = "ESTIMATION COMPLETED".to_string().bright_green().bold();
                println!("{} {}", prefix, message);
            }
            Err(_) => {
                let prefix = format!(
                    "{}{}{}",
                    "[".to_string().blue().bold(),
                    "✖".to_string().red().bold(),
                    "]".to_string().blue().bold()
                );
                let message = "ESTIMATION FAILED".to_string().red().bold();
                println!("{} {}", prefix, message);
            }
        }
    }

    result
}
