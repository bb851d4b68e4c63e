use crate::error::TickleError;
use crate::models::{Attribution, Task};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::ValueEnum;
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Rendered by the text formatter for an empty task list
pub const NO_TASKS_MESSAGE: &str = "No tasks found!";

const MARKDOWN_HEADING: &str = "# Outstanding Tasks";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One task per line
    #[default]
    Text,
    /// JSON array of tasks
    Json,
    /// Markdown grouped by file
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = TickleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" => Ok(OutputFormat::Markdown),
            other => Err(TickleError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Display switches shared by the formatters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Colourise markers in text output
    pub color: bool,

    /// Include short commit hash and message in attribution fragments
    pub verbose_attribution: bool,
}

/// Renders a task list
pub trait Formatter {
    fn format(&self, tasks: &[Task]) -> Result<String>;
}

/// `file:line: [MARKER] text`, one task per line
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    options: FormatOptions,
}

impl TextFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    fn marker_label(&self, marker: &str) -> String {
        let label = format!("[{}]", marker);
        if self.options.color {
            label.color(marker_color(marker)).to_string()
        } else {
            label
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, tasks: &[Task]) -> Result<String> {
        if tasks.is_empty() {
            return Ok(NO_TASKS_MESSAGE.to_string());
        }

        let lines: Vec<String> = tasks
            .iter()
            .map(|task| {
                let mut line = format!(
                    "{}:{}: {} {}",
                    task.file,
                    task.line,
                    self.marker_label(&task.marker),
                    task.text
                );
                if let Some(ref info) = task.attribution {
                    line.push_str(&format!(
                        " ({})",
                        attribution_fragment(info, self.options.verbose_attribution)
                    ));
                }
                line
            })
            .collect();

        Ok(lines.join("\n"))
    }
}

/// Pretty-printed JSON array; attribution keys appear only when populated
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, tasks: &[Task]) -> Result<String> {
        serde_json::to_string_pretty(tasks).context("Failed to serialize tasks to JSON")
    }
}

/// Markdown with one section per run of tasks from the same file
///
/// Tasks are grouped in the order given, so callers should sort by file
/// first if they want one section per file.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    options: FormatOptions,
}

impl MarkdownFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }
}

impl Formatter for MarkdownFormatter {
    fn format(&self, tasks: &[Task]) -> Result<String> {
        let mut output = format!("{}\n", MARKDOWN_HEADING);

        if tasks.is_empty() {
            output.push_str("\n_No tasks found._");
            return Ok(output);
        }

        let mut current_file: Option<&str> = None;
        for task in tasks {
            if current_file != Some(task.file.as_str()) {
                current_file = Some(&task.file);
                output.push_str(&format!("\n## {}\n\n", task.file));
            }

            output.push_str(&format!(
                "- Line {}: [{}] {}",
                task.line, task.marker, task.text
            ));
            if let Some(ref info) = task.attribution {
                output.push_str(&format!(
                    " _({})_",
                    attribution_fragment(info, self.options.verbose_attribution)
                ));
            }
            output.push('\n');
        }

        Ok(output.trim_end().to_string())
    }
}

/// Select a formatter by its tag (`text`, `json` or `markdown`)
pub fn get_formatter(
    format_type: &str,
    options: FormatOptions,
) -> Result<Box<dyn Formatter>, TickleError> {
    let format: OutputFormat = format_type.parse()?;
    Ok(formatter_for(format, options))
}

pub fn formatter_for(format: OutputFormat, options: FormatOptions) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(options)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(options)),
    }
}

/// `by Alice, 3 days ago`, plus `abc1234 "message"` when verbose
fn attribution_fragment(info: &Attribution, verbose: bool) -> String {
    let mut fragment = format!("by {}, {}", info.author, info.relative_time(Utc::now()));
    if verbose {
        fragment.push_str(&format!(
            ", {} \"{}\"",
            info.short_hash(),
            info.commit_message
        ));
    }
    fragment
}

fn marker_color(marker: &str) -> Color {
    match marker {
        "TODO" => Color::Blue,
        "FIXME" => Color::Yellow,
        "BUG" => Color::Red,
        "NOTE" => Color::Cyan,
        "HACK" => Color::Magenta,
        "CHECKBOX" => Color::Green,
        _ => Color::White,
    }
}

/// Write rendered output to a file, or stdout when no path is given
pub fn write_output(rendered: &str, output_path: Option<&Path>) -> Result<()> {
    if let Some(path) = output_path {
        let mut contents = rendered.to_string();
        contents.push('\n');
        fs::write(path, contents)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        eprintln!("Report written to {}", path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}
