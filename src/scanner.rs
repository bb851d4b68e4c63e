use crate::detectors::{default_detector, Detector};
use crate::models::{sort_tasks, SortBy, Task};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Component, Path};
use tracing::debug;

/// Extensions of binary and media files that are never read
const BINARY_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "exe", "bin", "so", "dll", "pyc"];

/// Options for a directory scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Markers to search for; `None` means the defaults plus checkboxes
    pub markers: Option<Vec<String>>,

    /// Glob patterns matched against the full path and the file name
    pub ignore_patterns: Vec<String>,

    pub sort_by: SortBy,

    /// Skip anything below a dot-directory, and dot-files themselves
    pub ignore_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            markers: None,
            ignore_patterns: Vec::new(),
            sort_by: SortBy::File,
            ignore_hidden: true,
        }
    }
}

/// Why a file contributed no tasks
#[derive(Debug)]
pub enum SkipReason {
    BinaryExtension,
    Hidden,
    IgnoredPattern(String),
    NotUtf8,
    Unreadable(io::Error),
}

/// Outcome of scanning one file
#[derive(Debug)]
pub enum FileScan {
    Tasks(Vec<Task>),
    Skipped(SkipReason),
}

/// Scan a directory tree with the detector implied by `options.markers`
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Vec<Task> {
    let detector = default_detector(options.markers.as_deref());
    scan_with_detector(root, options, &detector)
}

/// Scan a directory tree with an explicit detector
///
/// `options.markers` is ignored; the detector is used as given. Files that
/// cannot be read as UTF-8 text are skipped without error.
pub fn scan_with_detector(root: &Path, options: &ScanOptions, detector: &dyn Detector) -> Vec<Task> {
    let matchers = IgnoreMatcher::new(&options.ignore_patterns);
    let mut tasks = Vec::new();
    let mut files_scanned = 0usize;

    let mut walker = WalkBuilder::new(root);
    walker.standard_filters(false).follow_links(false);

    // Prune hidden directories early; the root itself is never considered hidden
    if options.ignore_hidden {
        walker.filter_entry(|entry| entry.depth() == 0 || !is_dot_name(entry.file_name()));
    }

    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(true) {
            continue;
        }

        let path = entry.path();
        if let Some(reason) = skip_reason(root, path, options.ignore_hidden, &matchers) {
            debug!(path = %path.display(), ?reason, "skipped");
            continue;
        }

        files_scanned += 1;
        match scan_file(path, detector) {
            FileScan::Tasks(found) => tasks.extend(found),
            FileScan::Skipped(reason) => debug!(path = %path.display(), ?reason, "skipped"),
        }
    }

    sort_tasks(&mut tasks, options.sort_by);

    debug!(
        root = %root.display(),
        files = files_scanned,
        tasks = tasks.len(),
        detector = detector.kind(),
        "scan complete"
    );

    tasks
}

/// Run the detector over every line of one file
pub fn scan_file(path: &Path, detector: &dyn Detector) -> FileScan {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            return FileScan::Skipped(SkipReason::NotUtf8);
        }
        Err(err) => return FileScan::Skipped(SkipReason::Unreadable(err)),
    };

    let file = display_path(path);
    let tasks = split_lines(&contents)
        .enumerate()
        .flat_map(|(idx, line)| detector.detect(line, idx + 1, &file))
        .collect();

    FileScan::Tasks(tasks)
}

/// Split on `\r\n`, `\n` or a lone `\r`; a trailing terminator yields no empty line
fn split_lines(contents: &str) -> impl Iterator<Item = &str> {
    let mut rest = contents;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                let line = &rest[..idx];
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

fn skip_reason(
    root: &Path,
    path: &Path,
    ignore_hidden: bool,
    matchers: &IgnoreMatcher,
) -> Option<SkipReason> {
    if is_likely_binary(path) {
        return Some(SkipReason::BinaryExtension);
    }

    if ignore_hidden && is_hidden(root, path) {
        return Some(SkipReason::Hidden);
    }

    matchers.matching(path).map(SkipReason::IgnoredPattern)
}

/// Check if a file is binary or media by its extension
pub fn is_likely_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True if any component below `root` starts with a dot
pub fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => is_dot_name(name),
        _ => false,
    })
}

fn is_dot_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// Path as reported in tasks, without a leading `./`
fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

/// Compiled ignore patterns
///
/// A pattern matches when `*pattern*` matches the full path, or `pattern`
/// matches the bare file name. `*` crosses directory separators. Only `*`,
/// `?` and `[...]` are special; braces match themselves.
pub struct IgnoreMatcher {
    patterns: Vec<(String, PatternMatcher)>,
}

enum PatternMatcher {
    Glob { full: GlobMatcher, name: GlobMatcher },
    // Patterns globset rejects (e.g. an unclosed `[`) are compared literally
    Literal,
}

impl IgnoreMatcher {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|pattern| (pattern.clone(), compile_pattern(pattern)))
            .collect();
        Self { patterns }
    }

    /// The first pattern matching `path`, if any
    pub fn matching(&self, path: &Path) -> Option<String> {
        let full = path.to_string_lossy();
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

        self.patterns
            .iter()
            .find(|(pattern, matcher)| match matcher {
                PatternMatcher::Glob {
                    full: full_glob,
                    name: name_glob,
                } => full_glob.is_match(&*full) || name_glob.is_match(&*name),
                PatternMatcher::Literal => full.contains(pattern.as_str()) || *name == **pattern,
            })
            .map(|(pattern, _)| pattern.clone())
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.matching(path).is_some()
    }
}

fn compile_pattern(pattern: &str) -> PatternMatcher {
    let pattern = escape_braces(pattern);
    let prefix = if pattern.starts_with('*') { "" } else { "*" };
    let suffix = if pattern.ends_with('*') { "" } else { "*" };
    let wrapped = GlobBuilder::new(&format!("{}{}{}", prefix, pattern, suffix))
        .literal_separator(false)
        .backslash_escape(false)
        .build();
    let bare = GlobBuilder::new(&pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build();

    match (wrapped, bare) {
        (Ok(full), Ok(name)) => PatternMatcher::Glob {
            full: full.compile_matcher(),
            name: name.compile_matcher(),
        },
        _ => {
            debug!(%pattern, "invalid glob, matching literally");
            PatternMatcher::Literal
        }
    }
}

/// Rewrite `{` and `}` outside character classes as `[{]` and `[}]`
fn escape_braces(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    let mut class_start = None;

    for (idx, c) in pattern.char_indices() {
        match (c, class_start) {
            ('[', None) => class_start = Some(idx),
            // A `]` right after `[` or `[!` is a member of the class
            (']', Some(start)) if !is_leading_member(pattern, start, idx) => class_start = None,
            ('{' | '}', None) => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
                continue;
            }
            _ => {}
        }
        escaped.push(c);
    }

    escaped
}

fn is_leading_member(pattern: &str, class_start: usize, idx: usize) -> bool {
    idx == class_start + 1 || (idx == class_start + 2 && pattern[class_start + 1..].starts_with('!'))
}
