use crate::models::{Attribution, Task};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{BlameOptions, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get git repository for a given path
pub fn get_repository(path: &Path) -> Result<Option<Repository>> {
    match Repository::discover(path) {
        Ok(repo) => Ok(Some(repo)),
        Err(err) => {
            debug!(path = %path.display(), "no git repository: {}", err.message());
            Ok(None)
        }
    }
}

/// Blame a single line and return the commit that last touched it
pub fn blame_line(repo: &Repository, file_path: &Path, line_number: usize) -> Result<Option<Attribution>> {
    let relative_path = repo_relative_path(repo, file_path)?;

    let mut opts = BlameOptions::new();
    opts.track_copies_same_file(true)
        .track_copies_same_commit_moves(true)
        .track_copies_same_commit_copies(true);

    // Untracked files and paths outside the work tree have no history
    let blame = match repo.blame_file(&relative_path, Some(&mut opts)) {
        Ok(b) => b,
        Err(_) => return Ok(None),
    };

    let hunk = match blame.get_line(line_number) {
        Some(h) => h,
        None => return Ok(None),
    };

    let commit_id = hunk.final_commit_id();
    if commit_id.is_zero() {
        return Ok(None); // line is not committed yet
    }
    let commit = repo.find_commit(commit_id)?;

    let author = commit.author();
    let time = commit.time();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .unwrap_or_else(|| Utc.fix());
    let commit_date = DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_else(Utc::now)
        .with_timezone(&offset);

    Ok(Some(Attribution {
        author: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or_default().to_string(),
        commit_hash: commit_id.to_string(),
        commit_date: commit_date.to_rfc3339(),
        commit_message: commit.summary().unwrap_or_default().to_string(),
    }))
}

/// Attribution for `file_path:line_number`, or `None` on any failure
pub fn lookup_attribution(
    repo: Option<&Repository>,
    file_path: &Path,
    line_number: usize,
) -> Option<Attribution> {
    let repo = repo?;

    blame_line(repo, file_path, line_number).unwrap_or_else(|err| {
        debug!(path = %file_path.display(), line = line_number, "blame failed: {:#}", err);
        None
    })
}

/// Attach attribution to every task that has history
pub fn attribute_tasks(repo: Option<&Repository>, tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .map(|task| {
            let info = lookup_attribution(repo, Path::new(&task.file), task.line);
            task.with_attribution(info)
        })
        .collect()
}

fn repo_relative_path(repo: &Repository, file_path: &Path) -> Result<PathBuf> {
    let workdir = repo.workdir().context("Repository has no working directory")?;
    let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    let absolute = file_path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", file_path.display()))?;

    Ok(absolute
        .strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .unwrap_or(absolute))
}
