//! Tickle - find outstanding task markers in a source tree
//!
//! Scans a directory for TODO, FIXME, BUG, NOTE and HACK markers and for
//! unchecked markdown checkboxes, then renders the findings as text, JSON or
//! markdown.
//!
//! Detection is plain substring and pattern matching over raw lines; no
//! language is parsed.
//!
//! # Example
//!
//! ```rust,no_run
//! use tickle::output::{formatter_for, FormatOptions, OutputFormat};
//! use tickle::scanner::{scan_directory, ScanOptions};
//! use std::path::Path;
//!
//! let tasks = scan_directory(Path::new("."), &ScanOptions::default());
//! let formatter = formatter_for(OutputFormat::Markdown, FormatOptions::default());
//! println!("{}", formatter.format(&tasks).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod filters;
pub mod git;
pub mod models;
pub mod output;
pub mod scanner;
pub mod summary;

// Re-export commonly used types
pub use detectors::{CommentMarkerDetector, CompositeDetector, Detector, MarkdownCheckboxDetector};
pub use error::TickleError;
pub use models::{Attribution, Config, SortBy, Task};
pub use output::{Formatter, OutputFormat};
pub use scanner::{scan_directory, scan_with_detector, ScanOptions};
pub use summary::Summary;
