// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! The pipeline JSON template and the per-sample documents made from it.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Error};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::utils;

pub const RUN_ID_FIELD: &str = "project_run_id";
pub const READ1_FIELD: &str = "input_fastq_read1_files";
pub const READ2_FIELD: &str = "input_fastq_read2_files";
pub const PATH_FIELD: &str = "path";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("json template must be a JSON object")]
    NotAnObject,

    #[error("json template has no `{0}` field")]
    MissingField(&'static str),

    #[error("json template field `{0}` must be a non-empty array of objects")]
    BadFileList(&'static str),
}

/// A JSON template with `input_fastq_read1_files` / `input_fastq_read2_files`
/// arrays whose first entry's `path` receives the sample's read files.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonTemplate {
    doc: Map<String, Value>,
}

impl JsonTemplate {
    /// Wrap a parsed template. The read 1 file list must be present since
    /// every sample fills it.
    pub fn new(value: Value) -> Result<JsonTemplate, TemplateError> {
        let mut doc = match value {
            Value::Object(doc) => doc,
            _ => return Err(TemplateError::NotAnObject),
        };
        first_entry(&mut doc, READ1_FIELD)?;
        Ok(JsonTemplate { doc })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<JsonTemplate, Error> {
        let path = path.as_ref();
        let reader = utils::open_buffered(path)?;
        let value: Value = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to open Json template - see:{}", path.display()))?;
        JsonTemplate::new(value)
            .with_context(|| format!("invalid Json template {}", path.display()))
    }

    /// Build the document of one sample. The template itself is not
    /// modified, so nothing leaks from one sample into the next. Without a
    /// `read2` the read 2 list is left as in the template.
    pub fn fill(
        &self,
        run_id: &str,
        read1: &str,
        read2: Option<&str>,
    ) -> Result<Value, TemplateError> {
        let mut doc = self.doc.clone();
        doc.insert(RUN_ID_FIELD.to_string(), Value::from(run_id));
        set_path(&mut doc, READ1_FIELD, read1)?;
        if let Some(read2) = read2 {
            set_path(&mut doc, READ2_FIELD, read2)?;
        }
        Ok(Value::Object(doc))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.doc
    }
}

fn first_entry<'a>(
    doc: &'a mut Map<String, Value>,
    field: &'static str,
) -> Result<&'a mut Map<String, Value>, TemplateError> {
    doc.get_mut(field)
        .ok_or(TemplateError::MissingField(field))?
        .as_array_mut()
        .and_then(|files| files.first_mut())
        .and_then(Value::as_object_mut)
        .ok_or(TemplateError::BadFileList(field))
}

fn set_path(
    doc: &mut Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<(), TemplateError> {
    first_entry(doc, field)?.insert(PATH_FIELD.to_string(), Value::from(path));
    Ok(())
}

/// Render `value` with 2-space indentation and keys in sorted order.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    // serde_json's Map is a BTreeMap, so keys come out sorted
    serde_json::to_string_pretty(value)
}

/// Write a sample document as UTF-8 to `path`.
pub fn write_sample_json(value: &Value, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let text = to_pretty_json(value)?;
    let mut writer = utils::create_buffered(path)?;
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("couldn't write {}", path.display()))?;
    Ok(())
}
