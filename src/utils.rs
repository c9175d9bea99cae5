// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Utility methods.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Error};
use chrono::Local;
use env_logger::Env;

const BUF_SIZE: usize = 32 * 1024;

/// Open a text file into a BufReader.
pub fn open_buffered<P: AsRef<Path>>(p: P) -> Result<BufReader<File>, Error> {
    let r = File::open(p.as_ref())
        .with_context(|| format!("couldn't open file {}", p.as_ref().display()))?;
    Ok(BufReader::with_capacity(BUF_SIZE, r))
}

/// Create (or truncate) a file and wrap it in a BufWriter.
pub fn create_buffered<P: AsRef<Path>>(p: P) -> Result<BufWriter<File>, Error> {
    let w = File::create(p.as_ref())
        .with_context(|| format!("couldn't create file {}", p.as_ref().display()))?;
    Ok(BufWriter::with_capacity(BUF_SIZE, w))
}

/// Create the directory `p` and its parents if it does not exist yet.
pub fn ensure_dir<P: AsRef<Path>>(p: P) -> Result<(), Error> {
    let p = p.as_ref();
    if !p.is_dir() {
        std::fs::create_dir_all(p)
            .with_context(|| format!("couldn't create directory {}", p.display()))?;
    }
    if !p.is_dir() {
        bail!("{} does not exist - create it and try again", p.display());
    }
    Ok(())
}

/// Render a path the way it is written into JSON files and logs.
pub fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Set up console logging. `RUST_LOG` overrides the default `info` level.
pub fn init_log() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
