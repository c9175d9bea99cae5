// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Project configuration.
//!
//! A project run is described by a shell-style `pipeline.cfg` made of
//! `KEY=value` assignments. The file is parsed directly rather than sourced,
//! so only assignments are understood: `export`, quoting, comments and
//! `$NAME` / `${NAME}` references to earlier keys or the process environment.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::run_log::LOG_FILE_NAME;

pub const LOG_BASE: &str = "LOG_BASE";
pub const PATH2_JSON_FILES: &str = "PATH2_JSON_FILES";
pub const JSON_TEMPLATE: &str = "JSON_TEMPLATE";
pub const DESIGN_FILE: &str = "DESIGN_FILE";
pub const READS_BASE: &str = "READS_BASE";
pub const ORGANISM: &str = "ORGANISM";
pub const RUN_ID: &str = "RUN_ID";

/// Suffix of the read files when none is given on the command line.
pub const DEFAULT_READS_SUFFIX: &str = "fastq";

lazy_static! {
    static ref KEY_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref VAR_REF_REGEX: Regex =
        Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").unwrap();
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pipeline.cfg missing - Check {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} missing - see:{key}")]
    MissingKey { key: &'static str, what: &'static str },

    #[error("Path to Reads files not a directory - see:{}", .0.display())]
    ReadsNotADirectory(PathBuf),

    #[error("The design file is missing - see:{}", .0.display())]
    DesignFileMissing(PathBuf),

    #[error("Json template file is missing - see:{}", .0.display())]
    TemplateMissing(PathBuf),
}

/// The key/value pairs assigned by a project configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectEnv {
    vars: BTreeMap<String, String>,
}

impl ProjectEnv {
    /// Load the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<ProjectEnv, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ProjectEnv::parse(BufReader::new(file)).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse `KEY=value` lines. Lines without an `=` and assignments to
    /// invalid names are skipped.
    pub fn parse<R: BufRead>(reader: R) -> Result<ProjectEnv, std::io::Error> {
        let mut env = ProjectEnv::default();
        for line in reader.lines() {
            let line = line?;
            if let Some((key, value)) = env.parse_line(&line) {
                env.vars.insert(key, value);
            }
        }
        Ok(env)
    }

    fn parse_line(&self, line: &str) -> Option<(String, String)> {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        let (key, raw) = line.split_once('=')?;
        if !KEY_REGEX.is_match(key) {
            return None;
        }
        Some((key.to_string(), self.parse_value(raw)))
    }

    /// Read a value the way the shell would: quoted and unquoted pieces are
    /// concatenated, single quotes are literal, and an unquoted `#` at the
    /// start of a word begins a comment.
    fn parse_value(&self, raw: &str) -> String {
        let mut value = String::new();
        let mut rest = raw.trim();
        let mut at_start = true;
        while !rest.is_empty() {
            if let Some(body) = rest.strip_prefix('\'') {
                let (quoted, tail) = body.split_once('\'').unwrap_or((body, ""));
                value.push_str(quoted);
                rest = tail;
            } else if let Some(body) = rest.strip_prefix('"') {
                let (quoted, tail) = body.split_once('"').unwrap_or((body, ""));
                value.push_str(&self.expand(quoted));
                rest = tail;
            } else {
                let end = rest.find(&['\'', '"'][..]).unwrap_or(rest.len());
                let (word, tail) = rest.split_at(end);
                if let Some(idx) = comment_start(word, at_start) {
                    value.push_str(&self.expand(word[..idx].trim_end()));
                    break;
                }
                value.push_str(&self.expand(word));
                rest = tail;
            }
            at_start = false;
        }
        value
    }

    /// Substitute `$NAME` and `${NAME}` with earlier assignments, then the
    /// process environment. Unknown names expand to nothing.
    pub fn expand(&self, value: &str) -> String {
        VAR_REF_REGEX
            .replace_all(value, |caps: &Captures<'_>| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map_or("", |m| m.as_str());
                match self.vars.get(name) {
                    Some(v) => v.clone(),
                    None => std::env::var(name).unwrap_or_default(),
                }
            })
            .into_owned()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Like `get`, but treats an empty value as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn comment_start(word: &str, at_start: bool) -> Option<usize> {
    word.char_indices()
        .find(|&(i, c)| {
            c == '#' && ((i == 0 && at_start) || word[..i].ends_with(char::is_whitespace))
        })
        .map(|(i, _)| i)
}

/// Validated settings for one run of the generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub log_dir: PathBuf,
    pub json_dir: PathBuf,
    pub json_template: PathBuf,
    pub design_file: PathBuf,
    pub reads_dir: PathBuf,
    pub organism: String,
    pub run_id: String,
    pub reads_suffix: String,
}

impl GeneratorConfig {
    /// Check the project environment and combine it with the command line
    /// overrides. `json_template` takes precedence over `JSON_TEMPLATE`.
    pub fn from_env(
        env: &ProjectEnv,
        json_template: Option<PathBuf>,
        reads_suffix: &str,
    ) -> Result<GeneratorConfig, ConfigError> {
        let required = |key: &'static str, what: &'static str| {
            env.get_non_empty(key)
                .ok_or(ConfigError::MissingKey { key, what })
        };

        let log_dir = PathBuf::from(required(LOG_BASE, "Log directory")?);
        let json_dir = PathBuf::from(required(PATH2_JSON_FILES, "Json files base directory")?);
        let reads_dir = PathBuf::from(required(READS_BASE, "Path to Reads files")?);
        if !reads_dir.is_dir() {
            return Err(ConfigError::ReadsNotADirectory(reads_dir));
        }
        let organism = required(ORGANISM, "Organism")?.to_string();

        let design_file = PathBuf::from(required(DESIGN_FILE, "Experiment design file")?);
        if !design_file.is_file() {
            return Err(ConfigError::DesignFileMissing(design_file));
        }

        let json_template = match json_template {
            Some(p) => p,
            None => PathBuf::from(required(JSON_TEMPLATE, "Json template")?),
        };
        if !json_template.is_file() {
            return Err(ConfigError::TemplateMissing(json_template));
        }

        Ok(GeneratorConfig {
            log_dir,
            json_dir,
            json_template,
            design_file,
            reads_dir,
            organism,
            run_id: env.get(RUN_ID).unwrap_or_default().to_string(),
            reads_suffix: reads_suffix.to_string(),
        })
    }

    /// Path of the run log.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    /// Output path of the JSON document for `sample_id`.
    pub fn sample_json_path(&self, sample_id: &str) -> PathBuf {
        self.json_dir
            .join(format!("{}.{}.json", sample_id, self.organism))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn parse(text: &str) -> ProjectEnv {
        ProjectEnv::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_assignments() {
        let env = parse(
            "# project settings\n\
             \n\
             export PROJECT_TEAM=biocore\n\
             RUN_ID=run_2019_06\n\
             ORGANISM=\"mouse\"\n\
             READS_BASE='/data/$PROJECT_TEAM/reads'\n\
             LOG_BASE=/data/logs # trailing comment\n\
             just some words\n",
        );
        assert_eq!(env.get("PROJECT_TEAM"), Some("biocore"));
        assert_eq!(env.get("RUN_ID"), Some("run_2019_06"));
        assert_eq!(env.get("ORGANISM"), Some("mouse"));
        assert_eq!(env.get("READS_BASE"), Some("/data/$PROJECT_TEAM/reads"));
        assert_eq!(env.get("LOG_BASE"), Some("/data/logs"));
        assert_eq!(env.len(), 5);
    }

    #[test]
    fn test_split_on_first_equals() {
        let env = parse("EXTRA_ARGS=--min-len=30\n");
        assert_eq!(env.get("EXTRA_ARGS"), Some("--min-len=30"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let env = parse("1BAD=x\nBAD KEY=y\nGOOD_KEY=z\n=nothing\n");
        assert_eq!(
            env.iter().collect::<Vec<_>>(),
            vec![("GOOD_KEY", "z")]
        );
    }

    #[test]
    fn test_expansion() {
        let env = parse(
            "WORKING_DIR=/projects/team\n\
             RUN_DIR=${WORKING_DIR}/run1\n\
             LOG_BASE=$RUN_DIR/logs\n\
             UNKNOWN=$SAMPLE_JSON_TEST_UNSET_VARIABLE/x\n",
        );
        assert_eq!(env.get("RUN_DIR"), Some("/projects/team/run1"));
        assert_eq!(env.get("LOG_BASE"), Some("/projects/team/run1/logs"));
        assert_eq!(env.get("UNKNOWN"), Some("/x"));
    }

    #[test]
    fn test_quoted_pieces() {
        let env = parse(
            "BASE=/data\n\
             ORGANISM=\"mouse\" # organism label\n\
             READS_BASE=\"$BASE\"/reads\n\
             LABEL='$BASE'-\"$BASE\"-$BASE\n\
             SPACED=\"a # b \"\n\
             HASHED=run#2\n\
             EMPTY=# nothing\n\
             OPEN=\"unterminated $BASE\n",
        );
        assert_eq!(env.get("ORGANISM"), Some("mouse"));
        assert_eq!(env.get("READS_BASE"), Some("/data/reads"));
        assert_eq!(env.get("LABEL"), Some("$BASE-/data-/data"));
        assert_eq!(env.get("SPACED"), Some("a # b "));
        assert_eq!(env.get("HASHED"), Some("run#2"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("OPEN"), Some("unterminated /data"));
    }

    #[test]
    fn test_expansion_from_process_env() {
        std::env::set_var("SAMPLE_JSON_TEST_DATA_ROOT", "/mnt/seq");
        let env = parse(
            "READS_BASE=$SAMPLE_JSON_TEST_DATA_ROOT/reads\n\
             LOG_BASE=\"${SAMPLE_JSON_TEST_DATA_ROOT}/logs\"\n",
        );
        assert_eq!(env.get("READS_BASE"), Some("/mnt/seq/reads"));
        assert_eq!(env.get("LOG_BASE"), Some("/mnt/seq/logs"));
    }

    #[test]
    fn test_later_assignment_wins() {
        let env = parse("ORGANISM=human\nORGANISM=mouse\n");
        assert_eq!(env.get("ORGANISM"), Some("mouse"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = ProjectEnv::from_path("/no/such/pipeline.cfg").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    struct Layout {
        _tmp: tempfile::TempDir,
        env: ProjectEnv,
    }

    fn layout() -> Layout {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("reads")).unwrap();
        fs::write(root.join("design.txt"), "Sample\tgroup\nS1\tctrl\n").unwrap();
        fs::write(root.join("template.json"), "{}").unwrap();

        let mut env = ProjectEnv::default();
        env.insert(LOG_BASE, root.join("logs").to_string_lossy());
        env.insert(PATH2_JSON_FILES, root.join("json").to_string_lossy());
        env.insert(READS_BASE, root.join("reads").to_string_lossy());
        env.insert(DESIGN_FILE, root.join("design.txt").to_string_lossy());
        env.insert(JSON_TEMPLATE, root.join("template.json").to_string_lossy());
        env.insert(ORGANISM, "mouse");
        Layout { _tmp: tmp, env }
    }

    #[test]
    fn test_generator_config() {
        let l = layout();
        let cfg = GeneratorConfig::from_env(&l.env, None, DEFAULT_READS_SUFFIX).unwrap();
        assert_eq!(cfg.organism, "mouse");
        assert_eq!(cfg.run_id, "");
        assert_eq!(cfg.reads_suffix, "fastq");
        assert!(cfg.log_file().ends_with("logs/json_generator.log"));
        assert!(cfg.sample_json_path("S1").ends_with("json/S1.mouse.json"));
    }

    #[test]
    fn test_template_override() {
        let mut l = layout();
        l.env.insert(RUN_ID, "run7");
        let other = l.env.get(READS_BASE).map(PathBuf::from).unwrap().join("other.json");
        fs::write(&other, "{}").unwrap();
        let cfg = GeneratorConfig::from_env(&l.env, Some(other.clone()), "fastq.gz").unwrap();
        assert_eq!(cfg.json_template, other);
        assert_eq!(cfg.run_id, "run7");
        assert_eq!(cfg.reads_suffix, "fastq.gz");
    }

    #[test]
    fn test_missing_keys() {
        for key in [LOG_BASE, PATH2_JSON_FILES, READS_BASE, ORGANISM, DESIGN_FILE] {
            let mut l = layout();
            l.env.insert(key, "");
            match GeneratorConfig::from_env(&l.env, None, "fastq") {
                Err(ConfigError::MissingKey { key: k, .. }) => assert_eq!(k, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_paths() {
        let mut l = layout();
        let design = l.env.get(DESIGN_FILE).unwrap().to_string();
        l.env.insert(READS_BASE, design);
        assert!(matches!(
            GeneratorConfig::from_env(&l.env, None, "fastq"),
            Err(ConfigError::ReadsNotADirectory(_))
        ));

        let mut l = layout();
        l.env.insert(DESIGN_FILE, "/no/such/design.txt");
        assert!(matches!(
            GeneratorConfig::from_env(&l.env, None, "fastq"),
            Err(ConfigError::DesignFileMissing(_))
        ));

        let l = layout();
        assert!(matches!(
            GeneratorConfig::from_env(&l.env, Some("/no/such/t.json".into()), "fastq"),
            Err(ConfigError::TemplateMissing(_))
        ));
    }
}
