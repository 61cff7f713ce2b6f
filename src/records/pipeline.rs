//! The top-languages aggregation.
//!
//! Stages, applied in order:
//!
//! 1. **unwind**: one `(project, language)` row per entry of each project's
//!    language list
//! 2. **group**: rows grouped by language, counting rows and collecting
//!    project names
//! 3. **sort**: by count, descending
//! 4. **limit**: keep the first `limit` groups
//!
//! Groups are created in first-seen order and the sort is stable, so equal
//! counts keep that order. Callers must not rely on it.

use crate::models::{LanguageUsage, StoredProject};
use std::collections::HashMap;

/// Rows kept by the top-languages report.
pub const TOP_LANGUAGES_LIMIT: usize = 5;

/// One row per `(project name, language)` pair.
pub fn unwind_languages<'a>(
    projects: &'a [StoredProject],
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    projects.iter().flat_map(|project| {
        project
            .record
            .technologies
            .languages
            .iter()
            .map(move |language| (project.record.name.as_str(), language.as_str()))
    })
}

/// Group unwound rows by language.
pub fn group_by_language<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<LanguageUsage> {
    let mut groups: Vec<LanguageUsage> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (project, language) in rows {
        let slot = *index.entry(language).or_insert_with(|| {
            groups.push(LanguageUsage {
                language: language.to_string(),
                count: 0,
                projects: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count += 1;
        group.projects.push(project.to_string());
    }
    groups
}

/// Run every stage and keep at most `limit` rows.
pub fn top_languages(projects: &[StoredProject], limit: usize) -> Vec<LanguageUsage> {
    let mut groups = group_by_language(unwind_languages(projects));
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(limit);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_project, RecordId};

    fn stored(name: &str, languages: &[&str]) -> StoredProject {
        let mut record = sample_project();
        record.name = name.to_string();
        record.technologies.languages = languages.iter().map(|l| l.to_string()).collect();
        StoredProject {
            id: RecordId::generate(),
            record,
        }
    }

    #[test]
    fn test_unwind_emits_one_row_per_language() {
        let projects = vec![stored("A", &["Python", "Scala"]), stored("B", &[]), stored("C", &["Go"])];
        let rows: Vec<_> = unwind_languages(&projects).collect();
        assert_eq!(rows, vec![("A", "Python"), ("A", "Scala"), ("C", "Go")]);
    }

    #[test]
    fn test_python_ranks_above_scala() {
        let projects = vec![stored("A", &["Python", "Scala"]), stored("B", &["Python"])];
        let top = top_languages(&projects, TOP_LANGUAGES_LIMIT);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].language, "Python");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].projects, vec!["A", "B"]);
        assert_eq!(top[1].language, "Scala");
        assert_eq!(top[1].count, 1);
    }

    #[test]
    fn test_limit_caps_rows() {
        let projects = vec![
            stored("A", &["L1", "L2", "L3", "L4"]),
            stored("B", &["L5", "L6", "L7"]),
        ];
        let top = top_languages(&projects, TOP_LANGUAGES_LIMIT);
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_counts_are_sorted_descending() {
        let projects = vec![
            stored("A", &["Rust"]),
            stored("B", &["Go", "Rust"]),
            stored("C", &["Go", "Rust", "Zig"]),
        ];
        let top = top_languages(&projects, TOP_LANGUAGES_LIMIT);
        let counts: Vec<usize> = top.iter().map(|row| row.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert_eq!(top[0].language, "Rust");
    }

    #[test]
    fn test_repeated_language_counts_twice() {
        let projects = vec![stored("A", &["Rust", "Rust"])];
        let top = top_languages(&projects, TOP_LANGUAGES_LIMIT);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].projects, vec!["A", "A"]);
    }

    #[test]
    fn test_empty_collection() {
        assert!(top_languages(&[], TOP_LANGUAGES_LIMIT).is_empty());
    }
}
