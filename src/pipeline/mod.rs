//! Building blocks for conversion and merge jobs.
//!
//! Each submodule owns one concern. The job types in [`crate::convert`],
//! [`crate::merge`] and [`crate::mixed`] compose them; nothing in here knows
//! about job-level outcomes or progress reporting.
//!
//! ## Data Flow
//!
//! ```text
//! paths ──▶ input ──▶ office ──▶ pdf ──▶ merged.pdf
//!          (classify) (DOCX→PDF) (pdfium)
//!                │                 ▲
//!                └──── workspace ──┘
//! ```
//!
//! 1. [`input`]     classify each path by extension, keep caller order
//! 2. [`workspace`] per-job scratch directory for converted intermediates
//! 3. [`office`]    drive the office suite through an RAII automation session
//! 4. [`pdf`]       count pages and concatenate documents through pdfium;
//!    blocking, so async callers go through `spawn_blocking`
//! 5. [`classify`]  turn raw collaborator error text into actionable messages

pub mod classify;
pub mod input;
pub mod office;
pub mod pdf;
pub mod workspace;
