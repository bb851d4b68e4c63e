use crate::error::TickleError;
use crate::models::{default_markers, Task, CHECKBOX_MARKER};
use regex::Regex;
use std::sync::LazyLock;

/// A list item (`-`, `*`, `+` or `1.`) followed by an empty checkbox
static UNCHECKED_CHECKBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\[ \]").expect("checkbox pattern is valid")
});

/// Inspects a single line and reports the tasks found on it
///
/// Detectors hold configuration only, so one instance can be shared across
/// files (and threads).
pub trait Detector: Send + Sync {
    fn detect(&self, line: &str, line_number: usize, file_path: &str) -> Vec<Task>;

    /// Short name used in diagnostics
    fn kind(&self) -> &'static str;
}

/// Finds marker strings anywhere in a line
///
/// Markers are tried in configured order and the first one contained in the
/// line wins, regardless of where it appears in the line. At most one task
/// is produced per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentMarkerDetector {
    markers: Vec<String>,
}

impl CommentMarkerDetector {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for CommentMarkerDetector {
    fn default() -> Self {
        Self::new(default_markers())
    }
}

impl Detector for CommentMarkerDetector {
    fn detect(&self, line: &str, line_number: usize, file_path: &str) -> Vec<Task> {
        self.markers
            .iter()
            .find(|marker| !marker.is_empty() && line.contains(marker.as_str()))
            .map(|marker| vec![Task::new(file_path, line_number, marker.as_str(), line.trim())])
            .unwrap_or_default()
    }

    fn kind(&self) -> &'static str {
        "comment"
    }
}

/// Reports unchecked markdown checkboxes (`- [ ] ...`) as CHECKBOX tasks
///
/// Checked boxes (`- [x] ...`) are done and never reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownCheckboxDetector;

impl Detector for MarkdownCheckboxDetector {
    fn detect(&self, line: &str, line_number: usize, file_path: &str) -> Vec<Task> {
        if UNCHECKED_CHECKBOX.is_match(line) {
            vec![Task::new(file_path, line_number, CHECKBOX_MARKER, line.trim())]
        } else {
            Vec::new()
        }
    }

    fn kind(&self) -> &'static str {
        "checkbox"
    }
}

/// Runs several detectors over the same line and concatenates their results
/// in detector order
#[derive(Default)]
pub struct CompositeDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl CompositeDetector {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Detector for CompositeDetector {
    fn detect(&self, line: &str, line_number: usize, file_path: &str) -> Vec<Task> {
        self.detectors
            .iter()
            .flat_map(|detector| detector.detect(line, line_number, file_path))
            .collect()
    }

    fn kind(&self) -> &'static str {
        "composite"
    }
}

/// Build a detector from a type tag
///
/// Only `"comment"` is supported; `markers` falls back to the default list
/// when `None`.
pub fn create_detector(
    detector_type: &str,
    markers: Option<&[String]>,
) -> Result<Box<dyn Detector>, TickleError> {
    match detector_type {
        "comment" => {
            let markers = markers.map(<[String]>::to_vec).unwrap_or_else(default_markers);
            Ok(Box::new(CommentMarkerDetector::new(markers)))
        }
        other => Err(TickleError::UnsupportedDetectorType(other.to_string())),
    }
}

/// The detector used when the caller does not supply one
///
/// Checkbox scanning is enabled when no marker list is given at all, or when
/// the list names CHECKBOX explicitly. CHECKBOX is removed from the list handed
/// to the comment detector, so a line that merely contains the word CHECKBOX
/// is not reported.
pub fn default_detector(markers: Option<&[String]>) -> CompositeDetector {
    let comment_markers = match markers {
        Some(markers) => markers
            .iter()
            .filter(|m| m.as_str() != CHECKBOX_MARKER)
            .cloned()
            .collect(),
        None => default_markers(),
    };

    let mut detectors: Vec<Box<dyn Detector>> =
        vec![Box::new(CommentMarkerDetector::new(comment_markers))];

    let wants_checkboxes = markers.is_none_or(|m| m.iter().any(|m| m == CHECKBOX_MARKER));
    if wants_checkboxes {
        detectors.push(Box::new(MarkdownCheckboxDetector));
    }

    CompositeDetector::new(detectors)
}
