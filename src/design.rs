// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Read the experiment design file, a tab-separated table with one sample per row.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::Error;

use crate::utils;

/// Rows containing any of these are header rows.
pub const HEADER_MARKERS: [&str; 2] = ["Sample", "sample_id"];

/// One data row of the design file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesignRow {
    /// 1-based line number within the design file
    pub line: usize,
    pub sample_id: String,
    /// Remaining tab-separated columns
    pub fields: Vec<String>,
}

impl DesignRow {
    /// Parse a single line, returning `None` for header, comment and blank lines.
    pub fn parse(line: &str, line_number: usize) -> Option<DesignRow> {
        if HEADER_MARKERS.iter().any(|m| line.contains(m)) {
            return None;
        }
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut fields = line.split('\t').map(|f| f.trim().to_string());
        let sample_id = fields.next()?;
        if sample_id.is_empty() {
            return None;
        }

        Some(DesignRow {
            line: line_number,
            sample_id,
            fields: fields.collect(),
        })
    }
}

/// Iterate over the data rows of a design file.
pub struct DesignReader<R> {
    lines: Lines<R>,
    line_number: usize,
    path: PathBuf,
}

impl DesignReader<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let reader = utils::open_buffered(&path)?;
        Ok(DesignReader::with_path(reader, path.as_ref()))
    }
}

impl<R: BufRead> DesignReader<R> {
    pub fn new(reader: R) -> Self {
        DesignReader::with_path(reader, Path::new("<design>"))
    }

    fn with_path(reader: R, path: &Path) -> Self {
        DesignReader {
            lines: reader.lines(),
            line_number: 0,
            path: path.to_path_buf(),
        }
    }
}

impl<R: BufRead> Iterator for DesignReader<R> {
    type Item = Result<DesignRow, Error>;

    fn next(&mut self) -> Option<Result<DesignRow, Error>> {
        for line in &mut self.lines {
            self.line_number += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    let msg = format!(
                        "error reading line {} of {}",
                        self.line_number,
                        self.path.display()
                    );
                    return Some(Err(Error::new(e).context(msg)));
                }
            };
            if let Some(row) = DesignRow::parse(&line, self.line_number) {
                return Some(Ok(row));
            }
        }
        None
    }
}
