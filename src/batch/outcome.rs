use log::info;
use std::path::PathBuf;

/// What happened to one annotation file during a batch run.
///
/// Per-file problems never abort a batch; they become outcomes so that a
/// caller (or a test) can observe every skip and failure instead of having
/// them swallowed.
#[derive(Clone, Debug, PartialEq)]
pub enum FileOutcome {
    /// The pipeline produced an output file.
    Written { source: PathBuf, output: PathBuf },
    /// Rendering found no image matching the annotation file.
    SkippedMissingImage { source: PathBuf, expected_image: PathBuf },
    /// Filtering/suppression left no boxes; no output file is written.
    EmptyResult { source: PathBuf },
    /// The file could not be processed (unreadable, malformed, unwritable).
    Failed { source: PathBuf, message: String },
}

/// Aggregated outcomes of one batch operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn written(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::SkippedMissingImage { .. }))
    }

    pub fn empty(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::EmptyResult { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn log_summary(&self, operation: &str) {
        info!(
            "{}: {} written, {} empty, {} skipped, {} failed ({} files total)",
            operation,
            self.written().count(),
            self.empty().count(),
            self.skipped().count(),
            self.failures().count(),
            self.outcomes.len(),
        );
    }
}

impl FromIterator<FileOutcome> for BatchReport {
    fn from_iter<T: IntoIterator<Item = FileOutcome>>(iter: T) -> Self {
        Self::from_outcomes(iter.into_iter().collect())
    }
}
