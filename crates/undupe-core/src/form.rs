//! Submission form state: validation, settings and the in-flight guard

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_COSINE_THRESHOLD: f64 = 0.9;
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select {0}.")]
    MissingFile(&'static str),
    #[error("A request from this form is already in flight")]
    InFlight,
}

/// Similarity thresholds sent with every submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Cosine similarity cutoff, 0.0..=1.0
    pub cosine: f64,
    /// Fuzzy ratio cutoff, 0..=100
    pub fuzzy: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cosine: DEFAULT_COSINE_THRESHOLD,
            fuzzy: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn nudge_cosine(&mut self, delta: f64) {
        // keep two decimals so the wire value stays tidy
        let value = ((self.cosine + delta) * 100.0).round() / 100.0;
        self.cosine = value.clamp(0.0, 1.0);
    }

    pub fn nudge_fuzzy(&mut self, delta: i16) {
        self.fuzzy = (self.fuzzy as i16 + delta).clamp(0, 100) as u8;
    }
}

/// Processing options shared by both forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub remove_stopwords: bool,
    pub model: String,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remove_stopwords: false,
            model: DEFAULT_MODEL.to_string(),
            thresholds: Thresholds::default(),
        }
    }
}

/// File-vs-file or file-vs-folder (zip archive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareKind {
    #[default]
    FileVsFile,
    FileVsFolder,
}

impl CompareKind {
    pub fn toggle(self) -> Self {
        match self {
            CompareKind::FileVsFile => CompareKind::FileVsFolder,
            CompareKind::FileVsFolder => CompareKind::FileVsFile,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompareKind::FileVsFile => "File vs File",
            CompareKind::FileVsFolder => "File vs Folder",
        }
    }
}

/// A validated dataset deduplication request
#[derive(Debug, Clone, PartialEq)]
pub struct DedupeRequest {
    pub file: PathBuf,
    pub text_column: Option<String>,
    pub settings: Settings,
}

/// A validated comparison request
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRequest {
    pub kind: CompareKind,
    pub query: PathBuf,
    /// A document for file-vs-file, a zip archive for file-vs-folder
    pub target: PathBuf,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupeForm {
    pub file: String,
    pub text_column: String,
    pub settings: Settings,
}

impl DedupeForm {
    pub fn validate(&self) -> Result<DedupeRequest, FormError> {
        let file = non_empty_path(&self.file).ok_or(FormError::MissingFile("a file first"))?;
        let text_column = Some(self.text_column.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(DedupeRequest {
            file,
            text_column,
            settings: self.settings.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareForm {
    pub kind: CompareKind,
    pub query: String,
    pub target: String,
    pub settings: Settings,
}

impl CompareForm {
    pub fn validate(&self) -> Result<CompareRequest, FormError> {
        let missing = FormError::MissingFile("both files to compare");
        let query = non_empty_path(&self.query).ok_or_else(|| missing.clone())?;
        let target = non_empty_path(&self.target).ok_or(missing)?;
        Ok(CompareRequest {
            kind: self.kind,
            query,
            target,
            settings: self.settings.clone(),
        })
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Advisory single-flight flag for one form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitGuard {
    in_flight: bool,
}

impl SubmitGuard {
    pub fn begin(&mut self) -> Result<(), FormError> {
        if self.in_flight {
            return Err(FormError::InFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Transient annotation shown under a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Error(String),
}

impl FormStatus {
    pub fn error(&self) -> Option<&str> {
        match self {
            FormStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}
