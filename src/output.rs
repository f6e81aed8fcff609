//! Result types returned by conversion and merge jobs.
//!
//! Jobs never return `Err` for problems with the user's files. They return
//! an outcome value that carries a success flag, the human-readable lines a
//! front-end shows, and typed per-file detail. Callers that prefer `?` can
//! turn a failed outcome into a [`DocMergeError`] with `into_result`.

use crate::error::{DocMergeError, FailureKind, FileError};
use crate::pipeline::input::{InputEntry, InputKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of converting one DOCX file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub input_path: PathBuf,
    /// Where the PDF was written; `None` on failure.
    pub output_path: Option<PathBuf>,
    /// One user-facing line.
    pub message: String,
    pub error: Option<FileError>,
}

impl ConversionResult {
    pub(crate) fn converted(input_path: PathBuf, output_path: PathBuf) -> Self {
        let message = format!("Converted to: {}", output_path.display());
        Self {
            success: true,
            input_path,
            output_path: Some(output_path),
            message,
            error: None,
        }
    }

    pub(crate) fn failed(input_path: PathBuf, error: FileError) -> Self {
        Self {
            success: false,
            input_path,
            output_path: None,
            message: error.message.clone(),
            error: Some(error),
        }
    }

    /// The written PDF path, or the failure as a fatal error.
    pub fn into_result(self) -> Result<PathBuf, DocMergeError> {
        match (self.output_path, self.error) {
            (Some(path), None) if self.success => Ok(path),
            (_, Some(error)) => Err(error.into_fatal()),
            _ => Err(DocMergeError::Internal(self.message)),
        }
    }
}

/// What happened to one input of a mixed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Already a PDF; queued for merging as-is.
    Queued,
    /// DOCX converted to a temporary PDF and queued.
    Converted,
    /// Not queued: conversion failed or the type was rejected.
    Failed,
    /// Not queued: unsupported type, skipped by policy.
    Skipped,
}

/// Per-input report of a mixed merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// 0-indexed position in the caller's list.
    pub index: usize,
    pub input_path: PathBuf,
    pub kind: InputKind,
    pub status: FileStatus,
    pub error: Option<FileError>,
}

impl FileReport {
    pub(crate) fn new(entry: &InputEntry, status: FileStatus, error: Option<FileError>) -> Self {
        Self {
            index: entry.index,
            input_path: entry.path.clone(),
            kind: entry.kind,
            status,
            error,
        }
    }
}

/// Counters for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Entries supplied by the caller.
    pub input_files: usize,
    /// DOCX entries converted successfully.
    pub converted_files: usize,
    /// Entries that failed (conversion or rejection).
    pub failed_files: usize,
    /// Entries skipped as unsupported.
    pub skipped_files: usize,
    /// PDFs handed to the merge step; 0 if it never ran.
    pub merged_files: usize,
    /// Pages in the written output; 0 if nothing was written.
    pub total_pages: usize,
    /// Wall-clock time of the job.
    pub duration_ms: u64,
}

/// Aggregated result of a merge job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub success: bool,
    /// Human-readable lines in the order they were produced.
    pub messages: Vec<String>,
    /// The written PDF; `None` unless `success` is true.
    pub output_path: Option<PathBuf>,
    /// The failure that decided the outcome (the first one, or
    /// [`FailureKind::NoValidInput`] when nothing was left to merge).
    pub error: Option<FileError>,
    /// Per-input detail; empty for plain PDF merges.
    pub files: Vec<FileReport>,
    pub stats: MergeStats,
}

impl MergeOutcome {
    pub(crate) fn new(input_files: usize) -> Self {
        Self {
            success: true,
            messages: Vec::new(),
            output_path: None,
            error: None,
            files: Vec::new(),
            stats: MergeStats {
                input_files,
                ..MergeStats::default()
            },
        }
    }

    /// Mark the job failed and record `line`. The first error is kept.
    pub(crate) fn fail(&mut self, error: FileError, line: String) {
        self.success = false;
        self.messages.push(line);
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// All message lines joined with `\n`.
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }

    /// Whether the outcome failed with the given kind.
    pub fn failed_with(&self, kind: FailureKind) -> bool {
        !self.success && self.error.as_ref().map(|e| e.kind) == Some(kind)
    }

    /// The written PDF path, or the deciding failure as a fatal error.
    pub fn into_result(self) -> Result<PathBuf, DocMergeError> {
        match (self.output_path, self.error) {
            (Some(path), None) if self.success => Ok(path),
            (_, Some(error)) => Err(error.into_fatal()),
            _ => Err(DocMergeError::Internal(self.messages.join("\n"))),
        }
    }
}

/// Basic facts about one PDF file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub path: PathBuf,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_valid_input() -> FileError {
        FileError {
            kind: FailureKind::NoValidInput,
            path: "out.pdf".into(),
            message: "No valid files to merge.".into(),
            detail: String::new(),
        }
    }

    #[test]
    fn message_joins_lines_in_order() {
        let mut o = MergeOutcome::new(2);
        o.messages.push("Skipped a.txt: unsupported file type".into());
        o.fail(no_valid_input(), "No valid files to merge.".into());
        assert_eq!(
            o.message(),
            "Skipped a.txt: unsupported file type\nNo valid files to merge."
        );
        assert!(o.failed_with(FailureKind::NoValidInput));
    }

    #[test]
    fn first_error_is_kept() {
        let mut o = MergeOutcome::new(2);
        let first = FileError {
            kind: FailureKind::MissingBackend,
            ..no_valid_input()
        };
        o.fail(first, "one".into());
        o.fail(no_valid_input(), "two".into());
        assert_eq!(o.error.as_ref().unwrap().kind, FailureKind::MissingBackend);
        assert_eq!(o.messages.len(), 2);
    }

    #[test]
    fn into_result_maps_to_fatal() {
        let mut o = MergeOutcome::new(1);
        o.fail(no_valid_input(), "No valid files to merge.".into());
        let err = o.into_result().unwrap_err();
        assert!(matches!(err, DocMergeError::NoValidInput));
    }

    #[test]
    fn successful_outcome_yields_path() {
        let mut o = MergeOutcome::new(1);
        o.output_path = Some("merged.pdf".into());
        assert_eq!(o.into_result().unwrap(), PathBuf::from("merged.pdf"));
    }

    #[test]
    fn outcome_is_json_serialisable() {
        let o = MergeOutcome::new(0);
        let json = serde_json::to_string(&o).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"input_files\":0"));
    }

    #[test]
    fn conversion_result_round_trip_into_result() {
        let ok = ConversionResult::converted("a.docx".into(), "/out/a.pdf".into());
        assert!(ok.message.contains("/out/a.pdf"));
        assert_eq!(ok.into_result().unwrap(), PathBuf::from("/out/a.pdf"));

        let err = ConversionResult::failed(
            "a.docx".into(),
            FileError {
                kind: FailureKind::MissingBackend,
                path: "a.docx".into(),
                message: "Conversion failed: no office application is installed.".into(),
                detail: "soffice not found".into(),
            },
        );
        assert!(!err.success);
        assert!(matches!(
            err.into_result(),
            Err(DocMergeError::MissingBackend { .. })
        ));
    }
}
