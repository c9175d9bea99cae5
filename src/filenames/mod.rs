//! Utilities for finding the read files of a sample on disk.

pub mod sample_reads;

use anyhow::{Context, Error};
use log::warn;
use std::path::Path;

pub use sample_reads::{tokenize, SampleReads};

/// List the names of the files directly inside `path`, sorted.
/// Directories are not descended into.
pub fn list_read_files(path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
    let path = path.as_ref();
    let mut res = Vec::new();
    let dir_files = std::fs::read_dir(path)
        .with_context(|| format!("couldn't list reads directory {}", path.display()))?;

    for f in dir_files {
        let entry = f?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => res.push(name),
            Err(name) => warn!("skipping read file with non UTF-8 name: {:?}", name),
        }
    }

    res.sort();
    Ok(res)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_list_read_files() -> Result<(), Error> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path();
        for f in ["s2_R1.fastq", "s1_R2.fastq", "s1_R1.fastq", "README"] {
            fs::write(dir.join(f), "")?;
        }
        fs::create_dir(dir.join("s1_nested.fastq"))?;
        fs::write(dir.join("s1_nested.fastq").join("s1_R3.fastq"), "")?;

        assert_eq!(
            list_read_files(dir)?,
            vec!["README", "s1_R1.fastq", "s1_R2.fastq", "s2_R1.fastq"]
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_reads() -> Result<(), Error> {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir()?;
        let staging = tmp.path().join("staging");
        let dir = tmp.path().join("reads");
        fs::create_dir(&staging)?;
        fs::create_dir(&dir)?;
        fs::write(staging.join("s1_R1.fastq"), "")?;

        symlink(staging.join("s1_R1.fastq"), dir.join("s1_R1.fastq"))?;
        symlink(&staging, dir.join("s1_linked_dir.fastq"))?;
        symlink(staging.join("gone.fastq"), dir.join("s1_R2.fastq"))?;

        assert_eq!(list_read_files(&dir)?, vec!["s1_R1.fastq"]);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_skipped() -> Result<(), Error> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir()?;
        let dir = tmp.path();
        fs::write(dir.join("s1_R1.fastq"), "")?;
        fs::write(dir.join(OsStr::from_bytes(b"s1_\xff_R2.fastq")), "")?;

        assert_eq!(list_read_files(dir)?, vec!["s1_R1.fastq"]);
        Ok(())
    }

    #[test]
    fn test_missing_reads_dir() {
        assert!(list_read_files("/no/such/reads").is_err());
    }
}
