use crate::models::{marker_priority, Task};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate counts for a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub by_marker: BTreeMap<String, usize>,
    pub file_count: usize,
}

impl Summary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut by_marker: BTreeMap<String, usize> = BTreeMap::new();
        let mut files = BTreeSet::new();

        for task in tasks {
            *by_marker.entry(task.marker.clone()).or_insert(0) += 1;
            files.insert(task.file.as_str());
        }

        Self {
            total: tasks.len(),
            by_marker,
            file_count: files.len(),
        }
    }

    /// Marker counts in marker-sort priority order, unknown markers last
    pub fn marker_breakdown(&self) -> Vec<(&str, usize)> {
        let mut breakdown: Vec<(&str, usize)> = self
            .by_marker
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(marker, count)| (marker.as_str(), *count))
            .collect();
        breakdown.sort_by_key(|(marker, _)| (marker_priority(marker), *marker));
        breakdown
    }

    /// e.g. "Found 3 tasks in 1 file"
    pub fn headline(&self) -> String {
        format!(
            "Found {} {} in {} {}",
            self.total,
            plural(self.total, "task"),
            self.file_count,
            plural(self.file_count, "file")
        )
    }

    /// Panel shown above text output; `None` for an empty scan
    ///
    /// Header cells are coloured only when `color` is set.
    pub fn render(&self, color: bool) -> Option<String> {
        if self.total == 0 {
            return None;
        }

        let header = ["Marker", "Count"].map(|title| {
            let cell = Cell::new(title);
            if color { cell.fg(Color::Cyan) } else { cell }
        });

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (marker, count) in self.marker_breakdown() {
            table.add_row(vec![marker.to_string(), count.to_string()]);
        }

        Some(format!("{}\n{}\n", self.headline(), table))
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}
