// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Generate sample-specific pipeline JSON files.
//!
//! For every sample of an experiment design file, find the sample's FASTQ
//! files in the reads directory, fill a copy of the pipeline's JSON template
//! with their paths and write it out as `<sample>.<organism>.json`.
//!
//! ```no_run
//! use sample_json::config::{GeneratorConfig, ProjectEnv};
//!
//! let env = ProjectEnv::from_path("cfgs/pipeline.cfg")?;
//! let cfg = GeneratorConfig::from_env(&env, None, "fastq.gz")?;
//! let summary = sample_json::generator::run(&cfg)?;
//! assert!(summary.is_success());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod design;
pub mod filenames;
pub mod generator;
pub mod run_log;
pub mod template;
pub mod utils;

pub use config::{ConfigError, GeneratorConfig, ProjectEnv};
pub use filenames::SampleReads;
pub use generator::{RunSummary, SampleError, SampleOutcome};
pub use template::JsonTemplate;
