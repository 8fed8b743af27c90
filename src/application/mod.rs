// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains the implementation of the `fesboot` binary.

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use fesboot::{Bootstrap, Boundaries, SingularityPolicy, FESBOOT_VERSION};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Estimate errors of free energy differences between four substates of a metadynamics simulation using block bootstrap."
)]
pub struct Args {
    #[arg(
        value_name = "BLOCK_NUM",
        help = "Number of blocks",
        long_help = "Number of contiguous blocks to divide the trajectory into."
    )]
    pub n_blocks: usize,

    #[arg(
        value_name = "PICK_COUNT",
        help = "Number of blocks picked per iteration",
        long_help = "Number of blocks randomly picked (with replacement) in each bootstrap iteration."
    )]
    pub n_picks: usize,

    #[arg(value_name = "CV1", help = "Name of the first collective variable")]
    pub cv1: String,

    #[arg(value_name = "CV2", help = "Name of the second collective variable")]
    pub cv2: String,

    #[arg(
        value_name = "BIAS_FILE",
        help = "PLUMED COLVAR file",
        long_help = "PLUMED COLVAR file with a '#! FIELDS' header containing the CVs and the bias potential."
    )]
    pub colvar: String,

    #[arg(
        short = 'o',
        long = "output",
        default_value = "boot.dat",
        help = "Output file with standard deviations"
    )]
    pub output: String,

    #[arg(long = "output-yaml", help = "Output yaml file with a summary")]
    pub output_yaml: Option<String>,

    #[arg(
        short = 'b',
        long = "bias",
        default_value = "metad.bias",
        help = "Name of the bias column"
    )]
    pub bias: String,

    #[arg(
        short = 'n',
        long = "iterations",
        default_value_t = 200,
        help = "Number of bootstrap iterations"
    )]
    pub iterations: usize,

    #[arg(
        long = "kbt",
        default_value_t = 2.478957,
        help = "Thermal energy kT in the units of the bias"
    )]
    pub kbt: f64,

    #[arg(
        long = "lower",
        default_value_t = 5.0,
        help = "Lower CV boundary",
        long_help = "Both CVs must be lower than this value for the system to be closed."
    )]
    pub lower: f64,

    #[arg(
        long = "upper",
        default_value_t = 50.0,
        help = "Upper CV boundary",
        long_help = "Both CVs must be higher than this value for the system to be opened."
    )]
    pub upper: f64,

    #[arg(
        short = 's',
        long = "seed",
        help = "Seed for the random number generator"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "exclude-singular",
        help = "Exclude infinite free energies from the standard deviations"
    )]
    pub exclude_singular: bool,

    #[arg(
        long = "silent",
        help = "Print nothing but errors",
        default_value_t = false
    )]
    pub silent: bool,

    #[arg(
        long = "backup",
        help = "Back up existing output files",
        default_value_t = false
    )]
    pub backup: bool,
}

/// Construct the bootstrap from the command line arguments.
fn build_bootstrap(args: &Args) -> Result<Bootstrap, Box<dyn std::error::Error + Send + Sync>> {
    let mut builder = Bootstrap::new();
    builder
        .colvar(args.colvar.as_str())
        .cv1(args.cv1.as_str())
        .cv2(args.cv2.as_str())
        .n_blocks(args.n_blocks)
        .n_picks(args.n_picks)
        .bias(args.bias.as_str())
        .output(args.output.as_str())
        .iterations(args.iterations)
        .kbt(args.kbt)
        .boundaries(Boundaries::new(args.lower, args.upper)?);

    if let Some(output_yaml) = &args.output_yaml {
        builder.output_yaml(output_yaml.as_str());
    }

    if let Some(seed) = args.seed {
        builder.seed(seed);
    }

    if args.exclude_singular {
        builder.singularity(SingularityPolicy::Exclude);
    }

    if args.silent {
        builder.silent();
    }

    if args.backup {
        builder.backup();
    }

    Ok(builder.build()?)
}

/// Parse the command line arguments.
/// Invalid numbers of blocks are reported together with the usage of the program.
fn parse_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::ValueValidation {
            let _ = e.print();
            eprintln!("\n{}", Args::command().render_usage());
            std::process::exit(e.exit_code());
        }

        e.exit()
    })
}

pub(crate) fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = parse_args();

    let bootstrap = build_bootstrap(&args);
    let silent = match &bootstrap {
        Ok(bootstrap) => bootstrap.silent(),
        Err(_) => args.silent,
    };

    if silent {
        colog::basic_builder()
            .filter(None, log::LevelFilter::Error)
            .init();
    } else {
        colog::init();
        let header = format!(">>> FESBOOT v{} <<<", FESBOOT_VERSION).bold();
        println!("\n{}\n", header);
    }

    let result = bootstrap.and_then(|bootstrap| {
        bootstrap.run()?;
        Ok(())
    });

    match &result {
        Ok(_) if !silent => {
            let prefix = format!(
                "{}{}{}",
                "[".to_string().blue().bold(),
                "✔".to_string().bright_green().bold(),
                "]".to_string().blue().bold()
            );
            let message = "BOOTSTRAP COMPLETED".to_string().bright_green().bold();
            println!("{} {}", prefix, message);
        }
        Ok(_) => (),
        Err(e) => {
            log::error!("{}", e);

            if !silent {
                let prefix = format!(
                    "{}{}{}",
                    "[".to_string().blue().bold(),
                    "✖".to_string().red().bold(),
                    "]".to_string().blue().bold()
                );
                let message = "BOOTSTRAP FAILED".to_string().red().bold();
                println!("{} {}", prefix, message);
            }
        }
    }

    result
}
