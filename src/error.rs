use thiserror::Error;

/// Rejected configuration requests
///
/// These are caller errors: an unknown tag is never silently replaced with a
/// default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TickleError {
    /// The detector type tag is not one we know how to build
    #[error("unknown detector type: {0}")]
    UnsupportedDetectorType(String),

    /// The output format tag is not one of text, json or markdown
    #[error("unknown format type: {0}")]
    UnsupportedFormat(String),

    /// The sort mode is not one of file or marker
    #[error("unknown sort mode: {0}, expected file or marker")]
    UnsupportedSortMode(String),
}
