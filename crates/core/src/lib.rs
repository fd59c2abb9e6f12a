//! Core library for extractorizer
//!
//! This crate implements the **Functional Core** of the extractorizer tools,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project is split into three crates:
//!
//! - **`extractorizer_core`** (this crate): pure analysis functions with zero I/O
//! - **`pdf`**: reads outlines, text lines and page inventories out of PDF files,
//!   and writes page ranges back out
//! - **`extractorizer`**: the CLI that loads documents, calls into this crate
//!   and prints reports (the Imperative Shell)
//!
//! Every function here takes plain data (outline entries, text runs, page
//! inventories) and returns plain data. The same input always produces the
//! same output: maps are ordered and nothing is random, so reports are stable
//! between runs.
//!
//! # Module Organization
//!
//! - [`outline`]: embedded outline usability verdict, level ranking and
//!   document-type hints
//! - [`chapters`]: chapter page ranges, selections and output file names
//! - [`headings`]: font-statistics heading detection for documents without
//!   a usable outline
//! - [`quality`]: overall structure quality of the detected headings
//! - [`stats`]: content and font statistics over sampled pages
//! - [`review`]: requests, prompts and reply parsing for language-model
//!   validation of a heading level
//! - [`metadata`]: PDF date formatting
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use extractorizer_core::outline::{outline_report, OutlineEntry, Verdict};
//!
//! let entries = vec![
//!     OutlineEntry { title: "Chapter 1".to_string(), level: 1, page: Some(1) },
//!     OutlineEntry { title: "Chapter 2".to_string(), level: 1, page: Some(12) },
//! ];
//!
//! let report = outline_report(&entries, 30);
//! assert_ne!(report.assessment.verdict, Verdict::Unsuitable);
//! ```

pub mod chapters;
pub mod headings;
pub mod metadata;
pub mod outline;
pub mod quality;
pub mod review;
pub mod stats;
