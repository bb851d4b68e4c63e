use crate::error::TickleError;
use crate::output::OutputFormat;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Markers searched for when no marker list is given
pub const DEFAULT_MARKERS: [&str; 5] = ["TODO", "FIXME", "BUG", "NOTE", "HACK"];

/// Marker emitted for unchecked markdown checkboxes
pub const CHECKBOX_MARKER: &str = "CHECKBOX";

/// Rank given to markers outside the known set
pub const UNKNOWN_MARKER_PRIORITY: u32 = 999;

pub fn default_markers() -> Vec<String> {
    DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()
}

/// A single task marker found in a file
///
/// Tasks are created by a detector and never mutated afterwards; attaching
/// attribution produces a new value via [`Task::with_attribution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Path of the file containing the marker
    pub file: String,

    /// Line number (1-indexed)
    pub line: usize,

    /// Marker tag, e.g. TODO or CHECKBOX
    pub marker: String,

    /// The line content with surrounding whitespace stripped
    pub text: String,

    /// Source control attribution, present only when a lookup succeeded.
    /// Flattened so the five keys are omitted entirely when absent.
    #[serde(flatten)]
    pub attribution: Option<Attribution>,
}

impl Task {
    pub fn new(
        file: impl Into<String>,
        line: usize,
        marker: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            marker: marker.into(),
            text: text.into(),
            attribution: None,
        }
    }

    /// Return a copy of this task carrying the given attribution
    pub fn with_attribution(self, attribution: Option<Attribution>) -> Self {
        Self {
            attribution,
            ..self
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: [{}] {}", self.file, self.line, self.marker, self.text)
    }
}

/// Commit metadata for the line a task was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub author: String,
    pub author_email: String,

    /// Full commit hash
    pub commit_hash: String,

    /// Commit time as an ISO-8601 (RFC 3339) string
    pub commit_date: String,

    /// First line of the commit message
    pub commit_message: String,
}

impl Attribution {
    /// Abbreviated commit hash (7 characters)
    pub fn short_hash(&self) -> &str {
        self.commit_hash.get(..7).unwrap_or(&self.commit_hash)
    }

    pub fn commit_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.commit_date)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Whole days between the commit and `now`
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.commit_time()
            .map(|t| now.signed_duration_since(t).num_days())
    }

    /// Human-readable age such as "3 days ago"; falls back to the raw date
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        match self.commit_time() {
            Some(time) => relative_time(time, now),
            None => self.commit_date.clone(),
        }
    }
}

fn relative_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    let (count, unit) = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Fixed rank of a marker when sorting by marker
pub fn marker_priority(marker: &str) -> u32 {
    match marker {
        "BUG" => 0,
        "FIXME" => 1,
        "TODO" => 2,
        "HACK" => 3,
        "NOTE" => 4,
        CHECKBOX_MARKER => 5,
        _ => UNKNOWN_MARKER_PRIORITY,
    }
}

/// How the final task list is ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// By file path, then line
    #[default]
    File,
    /// By marker priority, then marker, file and line
    Marker,
}

impl FromStr for SortBy {
    type Err = TickleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(SortBy::File),
            "marker" => Ok(SortBy::Marker),
            other => Err(TickleError::UnsupportedSortMode(other.to_string())),
        }
    }
}

/// Comparable key derived from a task for a given sort mode
///
/// Kept separate from `Task` equality: two distinct tasks may share a key
/// only if they share file and line.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    File(&'a str, usize),
    Marker(u32, &'a str, &'a str, usize),
}

pub fn sort_key(task: &Task, sort_by: SortBy) -> SortKey<'_> {
    match sort_by {
        SortBy::File => SortKey::File(&task.file, task.line),
        SortBy::Marker => SortKey::Marker(
            marker_priority(&task.marker),
            &task.marker,
            &task.file,
            task.line,
        ),
    }
}

pub fn compare_tasks(a: &Task, b: &Task, sort_by: SortBy) -> Ordering {
    sort_key(a, sort_by).cmp(&sort_key(b, sort_by))
}

pub fn sort_tasks(tasks: &mut [Task], sort_by: SortBy) {
    tasks.sort_by(|a, b| compare_tasks(a, b, sort_by));
}

/// Configuration loaded from a `.ticklerc` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Markers to search for; absent means the defaults plus checkboxes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<String>>,

    /// Glob patterns of paths to skip
    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub sort_by: SortBy,

    /// Scan files under dot-directories too
    #[serde(default)]
    pub include_hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attribution(commit_date: &str) -> Attribution {
        Attribution {
            author: "Alice".to_string(),
            author_email: "alice@example.com".to_string(),
            commit_hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
            commit_date: commit_date.to_string(),
            commit_message: "Initial commit".to_string(),
        }
    }

    #[test]
    fn test_task_display() {
        let task = Task::new("src/main.py", 5, "TODO", "# TODO: Implement feature");
        assert_eq!(task.to_string(), "src/main.py:5: [TODO] # TODO: Implement feature");
    }

    #[test]
    fn test_with_attribution_keeps_fields() {
        let task = Task::new("a.py", 3, "BUG", "# BUG: x");
        let attributed = task.clone().with_attribution(Some(attribution("2024-01-01T00:00:00+00:00")));

        assert_eq!(attributed.file, task.file);
        assert_eq!(attributed.line, 3);
        assert_eq!(attributed.attribution.unwrap().author, "Alice");
        assert!(task.attribution.is_none());
    }

    #[test]
    fn test_short_hash() {
        let info = attribution("2024-01-01T00:00:00+00:00");
        assert_eq!(info.short_hash(), "0123456");

        let short = Attribution {
            commit_hash: "abc".to_string(),
            ..info
        };
        assert_eq!(short.short_hash(), "abc");
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now();
        let at = |d: Duration| attribution(&(now - d).to_rfc3339());

        assert_eq!(at(Duration::seconds(10)).relative_time(now), "just now");
        assert_eq!(at(Duration::minutes(1)).relative_time(now), "1 minute ago");
        assert_eq!(at(Duration::hours(5)).relative_time(now), "5 hours ago");
        assert_eq!(at(Duration::days(1)).relative_time(now), "1 day ago");
        assert_eq!(at(Duration::days(60)).relative_time(now), "2 months ago");
        assert_eq!(at(Duration::days(800)).relative_time(now), "2 years ago");
    }

    #[test]
    fn test_relative_time_unparseable_date() {
        let info = attribution("last tuesday");
        assert_eq!(info.relative_time(Utc::now()), "last tuesday");
        assert_eq!(info.age_days(Utc::now()), None);
    }

    #[test]
    fn test_marker_priority() {
        assert_eq!(marker_priority("BUG"), 0);
        assert_eq!(marker_priority("FIXME"), 1);
        assert_eq!(marker_priority("TODO"), 2);
        assert_eq!(marker_priority("HACK"), 3);
        assert_eq!(marker_priority("NOTE"), 4);
        assert_eq!(marker_priority("CHECKBOX"), 5);
        assert_eq!(marker_priority("XXX"), UNKNOWN_MARKER_PRIORITY);
        assert_eq!(marker_priority("todo"), UNKNOWN_MARKER_PRIORITY);
    }

    #[test]
    fn test_sort_by_file() {
        let mut tasks = vec![
            Task::new("tests/test.py", 3, "BUG", "# BUG: Known issue"),
            Task::new("src/main.py", 12, "FIXME", "# FIXME: Fix bug"),
            Task::new("src/main.py", 5, "TODO", "# TODO: Implement feature"),
        ];
        sort_tasks(&mut tasks, SortBy::File);

        assert_eq!((tasks[0].file.as_str(), tasks[0].line), ("src/main.py", 5));
        assert_eq!((tasks[1].file.as_str(), tasks[1].line), ("src/main.py", 12));
        assert_eq!(tasks[2].file, "tests/test.py");
    }

    #[test]
    fn test_sort_by_marker() {
        let mut tasks = vec![
            Task::new("a.py", 1, "TODO", "# TODO"),
            Task::new("z.py", 9, "BUG", "# BUG"),
            Task::new("a.py", 2, "ZZZ", "# ZZZ"),
            Task::new("a.py", 3, "CUSTOM", "# CUSTOM"),
            Task::new("b.py", 1, "NOTE", "# NOTE"),
            Task::new("a.py", 4, "BUG", "# BUG"),
        ];
        sort_tasks(&mut tasks, SortBy::Marker);

        let order: Vec<(&str, &str)> = tasks
            .iter()
            .map(|t| (t.marker.as_str(), t.file.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("BUG", "a.py"),
                ("BUG", "z.py"),
                ("TODO", "a.py"),
                ("NOTE", "b.py"),
                ("CUSTOM", "a.py"),
                ("ZZZ", "a.py"),
            ]
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut tasks = vec![
            Task::new("b.py", 2, "HACK", "# HACK"),
            Task::new("a.py", 7, "TODO", "# TODO"),
            Task::new("a.py", 1, "FIXME", "# FIXME"),
        ];

        for mode in [SortBy::File, SortBy::Marker] {
            sort_tasks(&mut tasks, mode);
            let once = tasks.clone();
            sort_tasks(&mut tasks, mode);
            assert_eq!(tasks, once);
        }
    }

    #[test]
    fn test_sort_by_from_str() {
        assert_eq!("file".parse::<SortBy>().unwrap(), SortBy::File);
        assert_eq!("marker".parse::<SortBy>().unwrap(), SortBy::Marker);
        assert_eq!(
            "age".parse::<SortBy>(),
            Err(TickleError::UnsupportedSortMode("age".to_string()))
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.markers.is_none());
        assert!(config.ignore.is_empty());
        assert_eq!(config.sort_by, SortBy::File);
        assert!(!config.include_hidden);
    }
}
