//! Comparison and deduplication payloads returned by the remote service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of a file-vs-file comparison (`POST /compare`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePairResult {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub target_text: String,
    pub cosine_similarity: f64,
    /// Fuzzy ratio on a 0..=100 scale; integral on the wire in practice
    pub levenshtein_ratio: f64,
    pub is_duplicate: bool,
    #[serde(default)]
    pub query_filename: String,
    #[serde(default)]
    pub target_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One candidate in a file-vs-folder comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryMatch {
    pub filename: String,
    pub cosine_similarity: f64,
    pub levenshtein_ratio: f64,
    pub is_duplicate: bool,
}

/// Result of a file-vs-folder comparison (`POST /compare_dir`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryResult {
    /// Matches in server order (best first)
    #[serde(default)]
    pub matches: Vec<DirectoryMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DirectoryResult {
    pub fn duplicate_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_duplicate).count()
    }
}

/// Server-side artifact paths produced by a dedupe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeFiles {
    pub cleaned: String,
    pub near_dups: String,
    pub exact_dups: String,
    #[serde(default)]
    pub report: Option<String>,
    /// Any further artifacts (ingested, normalized, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl DedupeFiles {
    /// All downloadable artifacts as `(label, server path)`, named ones first
    pub fn artifacts(&self) -> Vec<(&str, &str)> {
        let mut out = vec![
            ("cleaned", self.cleaned.as_str()),
            ("near_dups", self.near_dups.as_str()),
            ("exact_dups", self.exact_dups.as_str()),
        ];
        if let Some(report) = &self.report {
            out.push(("report", report.as_str()));
        }
        out.extend(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        out
    }
}

/// Result of a dataset deduplication run (`POST /process`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupeResult {
    pub total_records: u64,
    pub exact_duplicates_removed: u64,
    pub near_duplicates_removed: u64,
    /// Fraction of records removed, 0.0..=1.0
    pub deduplication_rate: f64,
    pub files: DedupeFiles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DedupeResult {
    pub fn duplicates_removed(&self) -> u64 {
        self.exact_duplicates_removed + self.near_duplicates_removed
    }

    pub fn reduction_percent(&self) -> f64 {
        self.deduplication_rate * 100.0
    }

    /// Records kept; falls back to total minus removed when the server omits it
    pub fn records_kept(&self) -> u64 {
        self.final_records
            .unwrap_or_else(|| self.total_records.saturating_sub(self.duplicates_removed()))
    }
}

/// Any payload the service can return
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonResult {
    SinglePair(SinglePairResult),
    Directory(DirectoryResult),
    Dedupe(DedupeResult),
}

impl From<SinglePairResult> for ComparisonResult {
    fn from(result: SinglePairResult) -> Self {
        ComparisonResult::SinglePair(result)
    }
}

impl From<DirectoryResult> for ComparisonResult {
    fn from(result: DirectoryResult) -> Self {
        ComparisonResult::Directory(result)
    }
}

impl From<DedupeResult> for ComparisonResult {
    fn from(result: DedupeResult) -> Self {
        ComparisonResult::Dedupe(result)
    }
}

/// Format a levenshtein ratio the way the service reports it (integer when whole)
pub fn format_ratio(ratio: f64) -> String {
    if ratio.fract() == 0.0 && ratio.is_finite() {
        format!("{}", ratio as i64)
    } else {
        format!("{ratio:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair_decodes_integer_ratio() {
        let body = r#"{
            "timestamp": "20240101_120000",
            "query_filename": "a.txt",
            "target_filename": "b.txt",
            "query_text": "hello",
            "target_text": "hello",
            "cosine_similarity": 0.99871,
            "levenshtein_ratio": 100,
            "is_duplicate": true
        }"#;
        let result: SinglePairResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.levenshtein_ratio, 100.0);
        assert!(result.is_duplicate);
        assert_eq!(result.timestamp.as_deref(), Some("20240101_120000"));
    }

    #[test]
    fn test_single_pair_missing_texts_default_empty() {
        let body = r#"{"cosine_similarity": 0.5, "levenshtein_ratio": 40, "is_duplicate": false}"#;
        let result: SinglePairResult = serde_json::from_str(body).unwrap();
        assert!(result.query_text.is_empty());
        assert!(result.target_text.is_empty());
    }

    #[test]
    fn test_directory_keeps_server_order() {
        let body = r#"{"matches": [
            {"filename": "z.txt", "cosine_similarity": 0.95, "levenshtein_ratio": 92, "is_duplicate": true},
            {"filename": "a.txt", "cosine_similarity": 0.40, "levenshtein_ratio": 12, "is_duplicate": false}
        ], "target_zip": "docs.zip"}"#;
        let result: DirectoryResult = serde_json::from_str(body).unwrap();
        let names: Vec<_> = result.matches.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["z.txt", "a.txt"]);
        assert_eq!(result.duplicate_count(), 1);
    }

    #[test]
    fn test_dedupe_extra_files_and_derived_counts() {
        let body = r#"{
            "total_records": 200,
            "exact_duplicates_removed": 30,
            "near_duplicates_removed": 20,
            "deduplication_rate": 0.25,
            "files": {
                "cleaned": "/srv/a/cleaned.csv",
                "near_dups": "/srv/a/near.csv",
                "exact_dups": "/srv/a/exact.csv",
                "ingested": "/srv/a/ingested.csv",
                "normalized": "/srv/a/normalized.csv"
            }
        }"#;
        let result: DedupeResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.duplicates_removed(), 50);
        assert_eq!(result.records_kept(), 150);
        assert!((result.reduction_percent() - 25.0).abs() < 1e-9);
        assert!(result.files.report.is_none());

        let labels: Vec<_> = result.files.artifacts().iter().map(|(k, _)| *k).collect();
        assert_eq!(labels, vec!["cleaned", "near_dups", "exact_dups", "ingested", "normalized"]);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(87.0), "87");
        assert_eq!(format_ratio(87.456), "87.46");
    }
}
