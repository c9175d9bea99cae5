// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! json_generator: write the sample-specific json files of a project run.

use anyhow::Error;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use sample_json::config::{ConfigError, GeneratorConfig, ProjectEnv, DEFAULT_READS_SUFFIX};
use sample_json::generator;
use sample_json::utils::init_log;

const AFTER_HELP: &str = "\
What it does:
    Uses the json template to generate sample-specific json files under the
    location given by PATH2_JSON_FILES in pipeline.cfg.

Examples:
    json_generator -c runID/cfgs/pipeline.cfg -s fastq
    json_generator -c runID/cfgs/pipeline.cfg -j runID/cfgs/template.json
    json_generator --cfg=runID/cfgs/pipeline.cfg

Assumptions:
    1) The user can create files under the json and log directories
    2) The json template sits next to pipeline.cfg unless -j is given";

/// Generate sample-specific json files for a given experiment
#[derive(Parser, Debug)]
#[clap(name = "json_generator", version, after_help = AFTER_HELP)]
struct Args {
    /// Path to the project run's pipeline.cfg
    #[clap(short = 'c', long = "cfg", value_name = "PATH")]
    cfg: PathBuf,

    /// Path to the json template (default: JSON_TEMPLATE from pipeline.cfg)
    #[clap(short = 'j', long = "jtemp", value_name = "PATH")]
    jtemp: Option<PathBuf>,

    /// Suffix of the read files
    #[clap(short = 's', long = "suffix", value_name = "SUFFIX", default_value = DEFAULT_READS_SUFFIX)]
    suffix: String,
}

fn run(args: Args) -> Result<bool, Error> {
    let env = ProjectEnv::from_path(&args.cfg)?;
    let cfg = GeneratorConfig::from_env(&env, args.jtemp, &args.suffix)?;
    info!("generating sample json files with {:?}", cfg);

    let summary = generator::run(&cfg)?;
    info!(
        "{} json file(s) written, run log at {}",
        summary.written().count(),
        summary.log_file.display()
    );
    Ok(summary.is_success())
}

fn main() -> ExitCode {
    init_log();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                return ExitCode::FAILURE;
            }
        },
    };

    match run(args) {
        Ok(true) => {
            println!("Program complete");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("Program failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            if let Some(cfg_err) = err.downcast_ref::<ConfigError>() {
                println!("ERROR: {}", cfg_err);
                println!("{}", Args::command().render_help());
            } else {
                eprintln!("ERROR: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
