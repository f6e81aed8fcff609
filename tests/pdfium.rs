//! Integration tests against the real pdfium engine.
//!
//! They need a pdfium shared library (see `PdfiumEngine` for the lookup
//! order) and print `SKIP` instead of failing when none can be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test pdfium -- --nocapture

use docmerge::{FailureKind, MergeConfig, PdfEngine, PdfMerger, PdfiumEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test if no pdfium library can be bound.
macro_rules! skip_unless_pdfium {
    () => {{
        if let Err(e) = PdfiumEngine::default().bind() {
            println!("SKIP: pdfium not available ({e})");
            println!("      Set PDFIUM_LIB_PATH to run these tests");
            return;
        }
    }};
}

/// Write a minimal valid PDF with `pages` blank pages of `width` points.
///
/// The width is what lets the merge tests tell sources apart.
fn write_pdf(path: &Path, pages: usize, width: u32) {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();

    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages),
    ];
    for _ in 0..pages {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} 300] >>"
        ));
    }

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for off in offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    std::fs::write(path, out).unwrap();
}

fn fixture(dir: &Path, name: &str, pages: usize, width: u32) -> PathBuf {
    let p = dir.join(name);
    write_pdf(&p, pages, width);
    p
}

fn merger() -> PdfMerger {
    PdfMerger::new(Arc::new(PdfiumEngine::default()))
}

/// Page widths of a PDF, in order.
fn page_widths(path: &Path) -> Vec<u32> {
    let pdfium = PdfiumEngine::default().bind().unwrap();
    let doc = pdfium.load_pdf_from_file(path, None).unwrap();
    doc.pages()
        .iter()
        .map(|p| p.width().value.round() as u32)
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn inspect_reports_page_count() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = fixture(dir.path(), "three.pdf", 3, 200);

    let info = docmerge::inspect(&pdf, &MergeConfig::default()).unwrap();

    assert_eq!(info.page_count, 3);
    assert_eq!(info.path, pdf);
}

#[test]
fn merged_page_count_is_the_sum_in_input_order() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        fixture(dir.path(), "a.pdf", 2, 200),
        fixture(dir.path(), "b.pdf", 1, 300),
        fixture(dir.path(), "c.pdf", 3, 400),
    ];
    let output = dir.path().join("out").join("merged.pdf");

    let outcome = merger().merge(&inputs, &output);

    assert!(outcome.success, "{}", outcome.message());
    assert_eq!(outcome.stats.total_pages, 6);
    assert_eq!(
        page_widths(&output),
        [200, 200, 300, 400, 400, 400],
        "pages out of order"
    );
}

#[test]
fn duplicate_inputs_are_merged_as_given() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let a = fixture(dir.path(), "a.pdf", 1, 200);
    let output = dir.path().join("merged.pdf");

    let outcome = merger().merge(&[a.clone(), a], &output);

    assert!(outcome.success, "{}", outcome.message());
    assert_eq!(page_widths(&output), [200, 200]);
}

#[test]
fn one_unreadable_input_aborts_without_output() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.pdf");
    std::fs::write(&broken, b"this is not a pdf").unwrap();
    let inputs = vec![
        fixture(dir.path(), "a.pdf", 2, 200),
        broken,
        fixture(dir.path(), "c.pdf", 1, 300),
    ];
    let output = dir.path().join("merged.pdf");

    let outcome = merger().merge(&inputs, &output);

    assert!(outcome.failed_with(FailureKind::ReadFailure));
    assert!(outcome.message().contains("broken.pdf"));
    assert!(!output.exists());
    // Only the three inputs remain; no staging file.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn existing_output_is_replaced() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("merged.pdf");
    write_pdf(&output, 5, 500);
    let a = fixture(dir.path(), "a.pdf", 1, 200);

    let outcome = merger().merge(&[a], &output);

    assert!(outcome.success, "{}", outcome.message());
    assert_eq!(page_widths(&output), [200]);
}

#[test]
fn engine_concatenate_returns_page_total() {
    skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        fixture(dir.path(), "a.pdf", 4, 200),
        fixture(dir.path(), "b.pdf", 2, 300),
    ];
    let output = dir.path().join("raw.pdf");

    let pages = PdfiumEngine::default().concatenate(&inputs, &output).unwrap();

    assert_eq!(pages, 6);
    assert_eq!(PdfiumEngine::default().inspect(&output).unwrap().page_count, 6);
}
