//! PDF page-tree work via pdfium: count pages and concatenate documents.
//!
//! The merge logic never touches PDF structure itself; it goes through the
//! [`PdfEngine`] trait, whose real implementation [`PdfiumEngine`] wraps the
//! `pdfium-render` crate.
//!
//! ## Binding
//!
//! pdfium is a shared library loaded at runtime. [`PdfiumEngine`] looks for
//! it in this order:
//!
//! 1. the path given in [`MergeConfig::pdfium_library`]
//! 2. `PDFIUM_LIB_PATH`
//! 3. the platform library name in the current working directory
//! 4. the system library search path
//!
//! The engine binds per call. pdfium operations are blocking and CPU-bound;
//! async callers reach this code through `spawn_blocking` only.

use crate::config::MergeConfig;
use crate::output::PdfInfo;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failures reported by a [`PdfEngine`].
#[derive(Debug, Error)]
pub enum PdfEngineError {
    /// The engine itself could not be loaded.
    #[error("{0}")]
    Unavailable(String),

    /// A source document could not be opened or its pages imported.
    #[error("failed to read {path:?}: {detail}")]
    Read { path: PathBuf, detail: String },

    /// The concatenated document could not be written.
    #[error("failed to write {path:?}: {detail}")]
    Write { path: PathBuf, detail: String },
}

/// The PDF library seam.
pub trait PdfEngine: Send + Sync {
    /// Open `path` and report its page count and version.
    fn inspect(&self, path: &Path) -> Result<PdfInfo, PdfEngineError>;

    /// Write every page of every input, in order, to `output`.
    ///
    /// Must fail without writing when any input cannot be read.
    /// Returns the number of pages written.
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<usize, PdfEngineError>;
}

/// [`PdfEngine`] backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    library: Option<PathBuf>,
}

impl PdfiumEngine {
    pub fn new(library: Option<PathBuf>) -> Self {
        Self { library }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.pdfium_library.clone())
    }

    /// Bind to a pdfium library following the lookup order above.
    pub fn bind(&self) -> Result<Pdfium, PdfEngineError> {
        let bindings = match self.library {
            Some(ref path) => Pdfium::bind_to_library(path),
            None => match std::env::var_os("PDFIUM_LIB_PATH") {
                Some(path) => Pdfium::bind_to_library(PathBuf::from(path)),
                None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                    .or_else(|_| Pdfium::bind_to_system_library()),
            },
        }
        .map_err(|e| PdfEngineError::Unavailable(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PdfEngine for PdfiumEngine {
    fn inspect(&self, path: &Path) -> Result<PdfInfo, PdfEngineError> {
        let pdfium = self.bind()?;
        let document =
            pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| PdfEngineError::Read {
                    path: path.to_path_buf(),
                    detail: format!("{:?}", e),
                })?;

        Ok(PdfInfo {
            path: path.to_path_buf(),
            page_count: document.pages().len() as usize,
            pdf_version: format!("{:?}", document.version()),
        })
    }

    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<usize, PdfEngineError> {
        let pdfium = self.bind()?;
        let write_err = |e: PdfiumError| PdfEngineError::Write {
            path: output.to_path_buf(),
            detail: format!("{:?}", e),
        };

        let mut merged = pdfium.create_new_pdf().map_err(write_err)?;
        let mut total_pages = 0usize;

        for path in inputs {
            let read_err = |e: PdfiumError| PdfEngineError::Read {
                path: path.clone(),
                detail: format!("{:?}", e),
            };
            let source = pdfium.load_pdf_from_file(path, None).map_err(read_err)?;
            let pages = source.pages().len() as usize;
            merged.pages_mut().append(&source).map_err(read_err)?;
            debug!("Appended {} pages from {}", pages, path.display());
            total_pages += pages;
        }

        merged.save_to_file(output).map_err(write_err)?;
        info!(
            "Wrote {} pages from {} files to {}",
            total_pages,
            inputs.len(),
            output.display()
        );
        Ok(total_pages)
    }
}
