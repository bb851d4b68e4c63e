use crate::models::SortBy;
use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tickle")]
#[command(version, about = "Find outstanding task markers in a source tree", long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Comma-separated markers to search for (e.g. TODO,FIXME,CHECKBOX)
    #[arg(short, long, value_delimiter = ',')]
    pub markers: Option<Vec<String>>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Comma-separated glob patterns of paths to skip
    #[arg(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Sort order of the results
    #[arg(short, long, value_enum)]
    pub sort: Option<SortBy>,

    /// Also scan files under hidden (dot) directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Show who last touched each task line (from git blame)
    #[arg(long)]
    pub git: bool,

    /// Like --git, also showing commit hash and message
    #[arg(long)]
    pub git_verbose: bool,

    /// Filter: only show tasks last touched by this author
    #[arg(long)]
    pub author: Option<String>,

    /// Filter: only show tasks older than this age (e.g. "30d", "6m", "1y")
    #[arg(long)]
    pub older_than: Option<String>,

    /// Don't print the summary panel before text output
    #[arg(long)]
    pub no_summary: bool,

    /// Disable colored markers
    #[arg(long)]
    pub no_color: bool,

    /// Output file (if not specified, writes to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective settings to ./.ticklerc instead of scanning
    #[arg(long)]
    pub init_config: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether attribution has to be looked up
    pub fn wants_attribution(&self) -> bool {
        self.git || self.git_verbose || self.author.is_some() || self.older_than.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["tickle"]).unwrap();

        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.markers.is_none());
        assert!(cli.ignore.is_empty());
        assert!(cli.format.is_none());
        assert!(!cli.wants_attribution());
    }

    #[test]
    fn test_parse_lists_and_enums() {
        let cli = Cli::try_parse_from([
            "tickle", "src", "--markers", "TODO,FIXME", "--ignore", "a.py,b/*", "--format", "json",
            "--sort", "marker",
        ])
        .unwrap();

        assert_eq!(cli.markers, Some(vec!["TODO".to_string(), "FIXME".to_string()]));
        assert_eq!(cli.ignore, vec!["a.py".to_string(), "b/*".to_string()]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.sort, Some(SortBy::Marker));
    }

    #[test]
    fn test_filters_imply_attribution() {
        let cli = Cli::try_parse_from(["tickle", "--author", "alice"]).unwrap();
        assert!(cli.wants_attribution());
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["tickle", "--init-config", "--markers", "BUG"]).unwrap();

        assert!(cli.init_config);
        assert!(!cli.wants_attribution());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["tickle", "--format", "yaml"]).is_err());
    }
}
