//! Input classification: tag each caller-supplied path as DOCX, PDF or
//! unsupported.
//!
//! Only the file extension is looked at (case-insensitively). Contents are
//! never sniffed here; a `.pdf` that is not really a PDF is caught later
//! when the PDF engine tries to open it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The recognised type of one input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Docx,
    Pdf,
    Unsupported,
}

impl InputKind {
    /// Classify `path` by its extension, ignoring case.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("docx") => InputKind::Docx,
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => InputKind::Pdf,
            _ => InputKind::Unsupported,
        }
    }
}

/// One entry of an [`InputSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    /// 0-indexed position in the caller's list.
    pub index: usize,
    pub path: PathBuf,
    pub kind: InputKind,
}

impl InputEntry {
    /// The file name for messages, falling back to the full path.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

/// An ordered list of inputs. Order is the page order of the merged output;
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    entries: Vec<InputEntry>,
}

impl InputSpec {
    /// Classify every path, keeping the caller's order.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entries = paths
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                let path = p.into();
                let kind = InputKind::of(&path);
                InputEntry { index, path, kind }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[InputEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: InputKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for InputSpec {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self::from_paths(iter)
    }
}

/// Last path component as a string, or the whole path if there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(InputKind::of(Path::new("FILE.DOCX")), InputKind::Docx);
        assert_eq!(InputKind::of(Path::new("file.docx")), InputKind::Docx);
        assert_eq!(InputKind::of(Path::new("Report.Pdf")), InputKind::Pdf);
        assert_eq!(InputKind::of(Path::new("notes.txt")), InputKind::Unsupported);
        assert_eq!(InputKind::of(Path::new("no_extension")), InputKind::Unsupported);
        // Legacy Word format is not DOCX.
        assert_eq!(InputKind::of(Path::new("old.doc")), InputKind::Unsupported);
    }

    #[test]
    fn spec_keeps_order_and_duplicates() {
        let spec = InputSpec::from_paths(["b.pdf", "a.docx", "b.pdf", "x.txt"]);
        let names: Vec<_> = spec.entries().iter().map(|e| e.display_name()).collect();
        assert_eq!(names, ["b.pdf", "a.docx", "b.pdf", "x.txt"]);
        assert_eq!(spec.entries()[2].index, 2);
        assert_eq!(spec.count(InputKind::Pdf), 2);
        assert_eq!(spec.count(InputKind::Docx), 1);
        assert_eq!(spec.count(InputKind::Unsupported), 1);
    }

    #[test]
    fn collect_into_spec() {
        let spec: InputSpec = vec![PathBuf::from("a.pdf")].into_iter().collect();
        assert_eq!(spec.len(), 1);
        assert!(!spec.is_empty());
    }

    #[test]
    fn display_name_falls_back_to_path() {
        assert_eq!(display_name(Path::new("/x/y/report.docx")), "report.docx");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
