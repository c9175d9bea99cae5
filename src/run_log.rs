// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! The per-run report written under `LOG_BASE`.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Error;

use crate::config::GeneratorConfig;
use crate::filenames::SampleReads;
use crate::generator::SampleError;
use crate::utils;

/// Name of the run log file inside the log directory.
pub const LOG_FILE_NAME: &str = "json_generator.log";

/// Read file naming the matcher expects, quoted when a sample has no reads.
pub const READ_FILE_FORMAT: &str = "sampleID[delimiter]readID[delimiter][...]suffix";

const BANNER: &str = "**********************************";
const SAMPLE_SEPARATOR: &str = "----------------------------";

pub struct RunLog<W: Write> {
    writer: W,
}

impl RunLog<BufWriter<File>> {
    /// Create the log file, replacing the log of any previous run.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(RunLog::new(utils::create_buffered(path)?))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(writer: W) -> Self {
        RunLog { writer }
    }

    pub fn header(
        &mut self,
        date: impl Display,
        log_file: &Path,
        cfg: &GeneratorConfig,
    ) -> io::Result<()> {
        let w = &mut self.writer;
        writeln!(w, "{}", BANNER)?;
        writeln!(w, "{}", BANNER)?;
        writeln!(w, "Date:{}", date)?;
        writeln!(w)?;
        writeln!(w, "Log file:{}", log_file.display())?;
        writeln!(w, "Json template:{}", cfg.json_template.display())?;
        writeln!(w, "Json files base directory:{}", cfg.json_dir.display())?;
        writeln!(w, "Experiment Design File:{}", cfg.design_file.display())
    }

    pub fn sample(&mut self, sample: &SampleReads) -> io::Result<()> {
        writeln!(self.writer, "{}", SAMPLE_SEPARATOR)?;
        writeln!(self.writer, "SampleID:{}", sample.id())?;
        writeln!(self.writer, "Number of Reads:{}", sample.len())
    }

    pub fn reads(&mut self, read1: &Path, read2: Option<&Path>) -> io::Result<()> {
        writeln!(self.writer, "  READ1:{}", read1.display())?;
        if let Some(read2) = read2 {
            writeln!(self.writer, "  READ2:{}", read2.display())?;
        }
        Ok(())
    }

    pub fn json_file(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.writer, "Json file:{}", path.display())
    }

    pub fn sample_error(&mut self, err: &SampleError) -> io::Result<()> {
        match err {
            SampleError::NoReads { .. } => writeln!(
                self.writer,
                "ERROR: Bad read files name - expected format - {}",
                READ_FILE_FORMAT
            ),
            _ => writeln!(self.writer, "ERROR: {}", err),
        }
    }

    /// Write the closing status line and flush.
    pub fn finish(mut self, success: bool) -> io::Result<W> {
        let status = if success { "Program complete" } else { "Failed" };
        writeln!(self.writer, "{}", status)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
