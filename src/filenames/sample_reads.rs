use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"[A-Za-z]+|[0-9]+").unwrap();
}

/// Split a filename into its runs of letters and runs of digits.
/// `_L001_R1.fastq` gives `["L", "001", "R", "1", "fastq"]`.
pub fn tokenize(name: &str) -> Vec<&str> {
    TOKEN_REGEX.find_iter(name).map(|m| m.as_str()).collect()
}

/// The read files found for one sample of the design file.
///
/// Read files are expected to be named
/// `sampleID[delimiter]readID[delimiter][...]suffix`, e.g. `ctl_1_R1.fastq.gz`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleReads {
    id: String,
    reads: Vec<String>,
}

impl SampleReads {
    /// Select the files of `candidates` that belong to `sample_id`, keeping
    /// their order.
    pub fn new<S: AsRef<str>>(sample_id: &str, candidates: &[S], suffix: &str) -> SampleReads {
        let reads = candidates
            .iter()
            .map(|f| AsRef::<str>::as_ref(f))
            .filter(|f| is_sample_file(sample_id, f, suffix))
            .map(String::from)
            .collect();

        SampleReads {
            id: sample_id.to_string(),
            reads,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reads(&self) -> &[String] {
        &self.reads
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Paired-end samples have two read files.
    pub fn is_paired(&self) -> bool {
        self.reads.len() > 1
    }

    /// Find the file holding read `read_number` ("1" or "2").
    ///
    /// A lone file is returned whatever the read number. With several files,
    /// every token of the first file except `read_number` is treated as
    /// shared naming boilerplate and removed from each file's tokens; the
    /// file still carrying a `read_number` token is the answer. If more than
    /// one does, the last one wins. Lane or run numbers equal to the read
    /// number defeat this and can give the wrong mate or `None`. That
    /// includes the bcl2fastq sample number: with `heart_S1_L001_R1_001`
    /// and `heart_S1_L001_R2_001`, both reads resolve to the R2 file.
    pub fn get_read_file(&self, read_number: &str) -> Option<&str> {
        match self.reads.len() {
            0 => None,
            1 => Some(self.reads[0].as_str()),
            _ => {
                let first = tokenize(self.strip_id(&self.reads[0]));
                let mut remaining: Vec<(&str, Vec<&str>)> = self
                    .reads
                    .iter()
                    .map(|r| (r.as_str(), tokenize(self.strip_id(r))))
                    .collect();

                for token in first.iter().filter(|&&t| t != read_number) {
                    for (_, tokens) in remaining.iter_mut() {
                        if let Some(pos) = tokens.iter().position(|t| t == token) {
                            tokens.remove(pos);
                        }
                    }
                }

                remaining
                    .into_iter()
                    .filter(|(_, tokens)| tokens.contains(&read_number))
                    .map(|(read, _)| read)
                    .last()
            }
        }
    }

    fn strip_id<'a>(&self, read: &'a str) -> &'a str {
        read.strip_prefix(self.id.as_str()).unwrap_or(read)
    }
}

/// `filename` belongs to `sample_id` if it starts with the id followed by a
/// non-alphanumeric delimiter (or nothing) and ends with `suffix`. The
/// delimiter keeps `SAMPLE10_R1.fastq` away from sample `SAMPLE1`.
pub fn is_sample_file(sample_id: &str, filename: &str, suffix: &str) -> bool {
    if sample_id.is_empty() || !filename.ends_with(suffix) {
        return false;
    }
    match filename.strip_prefix(sample_id) {
        Some(rest) => rest
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric()),
        None => false,
    }
}
