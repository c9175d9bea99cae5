// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Generate the sample-specific JSON files of a project run.
//!
//! Every row of the design file is turned into a `SampleOutcome`. Rows whose
//! read files can't be resolved are logged and recorded as failures without
//! stopping the run; I/O and template errors abort it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use chrono::Local;
use itertools::Itertools;
use log::{error, info, warn};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::design::DesignReader;
use crate::filenames::{list_read_files, SampleReads};
use crate::run_log::RunLog;
use crate::template::{write_sample_json, JsonTemplate};
use crate::utils;

/// Row-level problems that fail the run without stopping it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("no read files found for sample {sample_id}")]
    NoReads { sample_id: String },

    #[error("sample {sample_id} has {} read files, expected 1 or 2: {}", .files.len(), .files.join(", "))]
    TooManyReads {
        sample_id: String,
        files: Vec<String>,
    },

    #[error("can't tell which file is read {read} of sample {sample_id} among: {}", .files.join(", "))]
    UnresolvedRead {
        sample_id: String,
        read: &'static str,
        files: Vec<String>,
    },
}

/// A sample document that was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleJson {
    pub sample_id: String,
    pub read1: PathBuf,
    pub read2: Option<PathBuf>,
    pub json_file: PathBuf,
}

pub type SampleOutcome = Result<SampleJson, SampleError>;

/// Outcome of every design row, in design-file order.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<SampleOutcome>,
    pub log_file: PathBuf,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    pub fn written(&self) -> impl Iterator<Item = &SampleJson> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SampleError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }
}

/// Create the log and JSON output directories if they are missing.
pub fn prepare_dirs(cfg: &GeneratorConfig) -> Result<(), Error> {
    utils::ensure_dir(&cfg.log_dir).context("Log directory missing")?;
    utils::ensure_dir(&cfg.json_dir).context("Json files base directory missing")?;
    Ok(())
}

/// Pick the read 1 and (for paired-end samples) read 2 files of `sample`,
/// as paths inside `reads_dir`.
pub fn resolve_reads(
    sample: &SampleReads,
    reads_dir: &Path,
) -> Result<(PathBuf, Option<PathBuf>), SampleError> {
    let unresolved = |read| SampleError::UnresolvedRead {
        sample_id: sample.id().to_string(),
        read,
        files: sample.reads().to_vec(),
    };

    match sample.len() {
        0 => Err(SampleError::NoReads {
            sample_id: sample.id().to_string(),
        }),
        1 | 2 => {
            let read1 = sample.get_read_file("1").ok_or_else(|| unresolved("1"))?;
            let read2 = if sample.is_paired() {
                Some(sample.get_read_file("2").ok_or_else(|| unresolved("2"))?)
            } else {
                None
            };
            if read2 == Some(read1) {
                return Err(unresolved("1"));
            }
            Ok((reads_dir.join(read1), read2.map(|r| reads_dir.join(r))))
        }
        _ => Err(SampleError::TooManyReads {
            sample_id: sample.id().to_string(),
            files: sample.reads().to_vec(),
        }),
    }
}

/// Run the generator over every sample of the design file.
pub fn run(cfg: &GeneratorConfig) -> Result<RunSummary, Error> {
    prepare_dirs(cfg)?;

    let template = JsonTemplate::from_path(&cfg.json_template)?;
    let read_files = list_read_files(&cfg.reads_dir)?;
    info!(
        "{} files in reads directory {}",
        read_files.len(),
        cfg.reads_dir.display()
    );

    let log_file = cfg.log_file();
    let mut run_log = RunLog::create(&log_file)?;
    run_log.header(Local::now().format("%Y-%m-%d"), &log_file, cfg)?;

    let mut outcomes = Vec::new();
    for row in DesignReader::from_path(&cfg.design_file)? {
        let row = row?;
        let sample = SampleReads::new(&row.sample_id, &read_files, &cfg.reads_suffix);
        run_log.sample(&sample)?;

        let outcome = process_sample(cfg, &template, &sample, &mut run_log)
            .with_context(|| format!("failed to process sample {}", sample.id()))?;
        match &outcome {
            Ok(written) => info!(
                "Sample:{} Json file:{}",
                written.sample_id,
                written.json_file.display()
            ),
            Err(err) => {
                error!("line {} of design file: {}", row.line, err);
                run_log.sample_error(err)?;
            }
        }
        outcomes.push(outcome);
    }

    if outcomes.is_empty() {
        warn!("no samples found in {}", cfg.design_file.display());
    }

    let summary = RunSummary { outcomes, log_file };
    run_log.finish(summary.is_success())?;

    let failed = summary.failures().map(|e| e.to_string()).collect_vec();
    if !failed.is_empty() {
        error!("{} sample(s) failed:\n{}", failed.len(), failed.join("\n"));
    }
    Ok(summary)
}

fn process_sample<W: Write>(
    cfg: &GeneratorConfig,
    template: &JsonTemplate,
    sample: &SampleReads,
    run_log: &mut RunLog<W>,
) -> Result<SampleOutcome, Error> {
    let (read1, read2) = match resolve_reads(sample, &cfg.reads_dir) {
        Ok(reads) => reads,
        Err(err) => return Ok(Err(err)),
    };
    run_log.reads(&read1, read2.as_deref())?;

    let read1_str = utils::path_string(&read1);
    let read2_str = read2.as_deref().map(utils::path_string);
    let doc = template.fill(&cfg.run_id, &read1_str, read2_str.as_deref())?;

    let json_file = cfg.sample_json_path(sample.id());
    run_log.json_file(&json_file)?;
    write_sample_json(&doc, &json_file)?;

    Ok(Ok(SampleJson {
        sample_id: sample.id().to_string(),
        read1,
        read2,
        json_file,
    }))
}
