//! # docmerge
//!
//! Convert Word documents to PDF through an installed office suite, and merge
//! mixed lists of DOCX and PDF files into a single PDF.
//!
//! ## Why this crate?
//!
//! Rendering DOCX faithfully means running a real office suite; no pure-Rust
//! layout engine gets tables, fields and embedded fonts right. This crate
//! drives LibreOffice headlessly for the rendering, and does the page-tree
//! work with pdfium, so a mixed list of reports and scans comes out as one
//! PDF in the order the user chose.
//!
//! ## Pipeline Overview
//!
//! ```text
//! [a.docx, b.pdf, c.docx]
//!  │
//!  ├─ 1. Classify  by extension (case-insensitive), order preserved
//!  ├─ 2. Convert   each DOCX into a per-job temp workspace, one at a time
//!  ├─ 3. Merge     every page of every PDF, in order (pdfium)
//!  └─ 4. Cleanup   temp workspace removed on every path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmerge::{merge_mixed, MergeConfig};
//!
//! let config = MergeConfig::default();
//! let outcome = merge_mixed(&["cover.docx", "scan.pdf", "annex.docx"], "bundle.pdf", &config);
//! println!("{}", outcome.message());
//! if !outcome.success {
//!     std::process::exit(1);
//! }
//! ```
//!
//! Jobs report problems with the user's files through their outcome value,
//! not through `Err`: see [`MergeOutcome`] and [`ConversionResult`]. Both
//! have an `into_result` for callers that prefer `?`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docmerge` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docmerge = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! | Needed for | What |
//! |------------|------|
//! | DOCX input | `soffice` or `libreoffice` on `PATH`, or [`MergeConfig::office_program`] |
//! | merging    | a pdfium shared library; see [`PdfiumEngine`] for the lookup order |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod merge;
pub mod mixed;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MergeConfig, MergeConfigBuilder, UnsupportedPolicy};
pub use convert::{convert_docx, DocumentConverter};
pub use error::{DocMergeError, FailureKind, FileError};
pub use merge::{inspect, merge_pdfs, PdfMerger};
pub use mixed::{merge_mixed, MixedMergeOrchestrator};
pub use output::{ConversionResult, FileReport, FileStatus, MergeOutcome, MergeStats, PdfInfo};
pub use pipeline::input::{InputEntry, InputKind, InputSpec};
pub use pipeline::office::{AutomationSession, BackendFailure, LibreOffice, OfficeBackend};
pub use pipeline::pdf::{PdfEngine, PdfEngineError, PdfiumEngine};
pub use progress::{MergeProgressCallback, NoopProgressCallback, ProgressCallback};
