//! Search filtering over the note collection.
//!
//! Both filters are pure projections: they never reorder or mutate notes.
use log::trace;

use crate::Note;

/// Notes whose title, content or any tag contains `query`, ignoring case.
///
/// An empty query returns every note. Order is the collection order.
pub fn filter<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if query.is_empty() {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    let matches: Vec<&Note> = notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
                || note.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect();

    trace!("Query '{}' matched {} of {} notes", query, matches.len(), notes.len());
    matches
}

/// Notes carrying `tag`, compared trimmed and case-insensitively
pub fn filter_by_tag<'a>(notes: &'a [Note], tag: &str) -> Vec<&'a Note> {
    notes.iter().filter(|note| note.has_tag(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::now;

    fn note(id: &str, title: &str, content: &str, tags: &[&str]) -> Note {
        let mut note = Note::new(id.to_string(), now());
        note.title = title.to_string();
        note.content = content.to_string();
        note.tags = tags.iter().map(|t| t.to_string()).collect();
        note
    }

    fn sample() -> Vec<Note> {
        vec![
            note("1", "Shopping", "eggs and milk", &["home"]),
            note("2", "Meeting Notes", "discuss budget", &["work"]),
            note("3", "Budget ideas", "", &[]),
        ]
    }

    fn ids(found: Vec<&Note>) -> Vec<&str> {
        found.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let notes = sample();
        assert_eq!(ids(filter(&notes, "")), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_matches_title_content_and_tags_case_insensitively() {
        let notes = vec![note("2", "Meeting Notes", "discuss budget", &["work"])];
        for query in ["budget", "MEETING", "Work", "notes"] {
            assert_eq!(ids(filter(&notes, query)), vec!["2"], "query {}", query);
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        let notes = sample();
        assert!(filter(&notes, "xyz").is_empty());
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let notes = sample();
        assert_eq!(ids(filter(&notes, "budget")), vec!["2", "3"]);
    }

    #[test]
    fn test_filter_by_tag_is_exact() {
        let notes = sample();
        assert_eq!(ids(filter_by_tag(&notes, " WORK ")), vec!["2"]);
        assert!(filter_by_tag(&notes, "wo").is_empty());
    }
}
