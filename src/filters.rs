use crate::models::Task;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;

/// Keep tasks whose commit is at least `min_age` old ("30d", "2w", "6m", "1y")
///
/// Tasks without attribution are dropped.
pub fn filter_by_age(tasks: Vec<Task>, min_age: &str) -> Result<Vec<Task>> {
    let min_days = parse_age_days(min_age).with_context(|| format!("Invalid age format: {}", min_age))?;
    let now = Utc::now();

    Ok(tasks
        .into_iter()
        .filter(|task| {
            task.attribution
                .as_ref()
                .and_then(|info| info.age_days(now))
                .is_some_and(|age| age >= min_days)
        })
        .collect())
}

/// Keep tasks whose author name or email contains `needle` (case-insensitive)
///
/// Tasks without attribution are dropped.
pub fn filter_by_author(tasks: Vec<Task>, needle: &str) -> Vec<Task> {
    let needle = needle.to_lowercase();

    tasks
        .into_iter()
        .filter(|task| {
            task.attribution.as_ref().is_some_and(|info| {
                info.author.to_lowercase().contains(&needle)
                    || info.author_email.to_lowercase().contains(&needle)
            })
        })
        .collect()
}

/// Parse an age like "30d" into whole days
fn parse_age_days(s: &str) -> Result<i64> {
    let s = s.trim();
    let Some(unit) = s.chars().last() else {
        bail!("Empty duration string");
    };
    let number = &s[..s.len() - unit.len_utf8()];

    let count: i64 = number
        .parse()
        .with_context(|| format!("Invalid number in duration: {}", number))?;

    let days_per_unit = match unit {
        'd' => 1,
        'w' => 7,
        'm' => 30,
        'y' => 365,
        _ => return Err(anyhow!("Invalid duration unit: {}. Use d, w, m, or y", unit)),
    };

    count
        .checked_mul(days_per_unit)
        .ok_or_else(|| anyhow!("Duration too large: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribution;
    use chrono::Duration;

    fn task_by(author: &str, age_days: i64) -> Task {
        Task::new("test.py", 1, "TODO", "# TODO: test").with_attribution(Some(Attribution {
            author: author.to_string(),
            author_email: format!("{}@example.com", author.to_lowercase()),
            commit_hash: "abc1234".to_string(),
            commit_date: (Utc::now() - Duration::days(age_days)).to_rfc3339(),
            commit_message: "commit".to_string(),
        }))
    }

    #[test]
    fn test_parse_age_days() {
        assert_eq!(parse_age_days("1d").unwrap(), 1);
        assert_eq!(parse_age_days("2w").unwrap(), 14);
        assert_eq!(parse_age_days("3m").unwrap(), 90);
        assert_eq!(parse_age_days(" 1y ").unwrap(), 365);

        assert!(parse_age_days("").is_err());
        assert!(parse_age_days("d").is_err());
        assert!(parse_age_days("invalid").is_err());
        assert!(parse_age_days("10x").is_err());
    }

    #[test]
    fn test_parse_age_days_overflow() {
        assert!(parse_age_days("9223372036854775807y").is_err());
        assert!(parse_age_days("9223372036854775807w").is_err());
        assert_eq!(parse_age_days("9223372036854775807d").unwrap(), i64::MAX);

        let err = filter_by_age(vec![task_by("Alice", 1)], "9223372036854775807y").unwrap_err();
        assert!(format!("{:#}", err).contains("Duration too large"));
    }

    #[test]
    fn test_filter_by_age() {
        let tasks = vec![task_by("Alice", 10), task_by("Bob", 50), task_by("Carol", 100)];

        let filtered = filter_by_age(tasks, "30d").unwrap();
        let authors: Vec<&str> = filtered
            .iter()
            .map(|t| t.attribution.as_ref().unwrap().author.as_str())
            .collect();
        assert_eq!(authors, vec!["Bob", "Carol"]);

        assert!(filter_by_age(vec![task_by("Alice", 1)], "bogus").is_err());
    }

    #[test]
    fn test_filter_by_author() {
        let tasks = vec![task_by("Alice", 1), task_by("Bob", 2), task_by("Carol", 3)];

        let filtered = filter_by_author(tasks.clone(), "ALICE");
        assert_eq!(filtered.len(), 1);

        let by_email = filter_by_author(tasks, "bob@");
        assert_eq!(by_email[0].attribution.as_ref().unwrap().author, "Bob");
    }

    #[test]
    fn test_filters_drop_unattributed() {
        let tasks = vec![Task::new("a.py", 1, "TODO", "# TODO")];

        assert!(filter_by_age(tasks.clone(), "0d").unwrap().is_empty());
        assert!(filter_by_author(tasks, "").is_empty());
    }
}
