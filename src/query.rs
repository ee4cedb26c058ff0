//! Search and category aggregation over the flat bookmark collection.

use crate::model::{Bookmark, CategoryCount, ALL_CATEGORIES};
use std::collections::HashMap;

/// Filter the collection by free-text query and selected category.
///
/// The text match is a case-insensitive substring test applied independently
/// to title, url, and category; a bookmark matches if any field contains the
/// query. An empty query means no text filtering. When `selected_category`
/// is not the `"All"` sentinel, the result is further narrowed by exact
/// category equality. Input order is preserved.
pub fn filter<'a>(
    bookmarks: &'a [Bookmark],
    query: &str,
    selected_category: &str,
) -> Vec<&'a Bookmark> {
    let lower_query = query.to_lowercase();

    bookmarks
        .iter()
        .filter(|b| {
            lower_query.is_empty()
                || b.title.to_lowercase().contains(&lower_query)
                || b.url.to_lowercase().contains(&lower_query)
                || b.category.to_lowercase().contains(&lower_query)
        })
        .filter(|b| selected_category == ALL_CATEGORIES || b.category == selected_category)
        .collect()
}

/// Count bookmarks per category, sorted by count descending.
///
/// Ties keep first-appearance order — pill ordering by popularity is a
/// user-visible guarantee, so the sort must be stable. Linear in collection
/// size; recomputed in full after every mutation.
pub fn aggregate(bookmarks: &[Bookmark]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for b in bookmarks {
        let entry = counts.entry(b.category.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(b.category.as_str());
        }
        *entry += 1;
    }

    let mut result: Vec<CategoryCount> = order
        .into_iter()
        .map(|name| CategoryCount {
            name: name.to_string(),
            count: counts[name],
        })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, title: &str, url: &str, category: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            date_added: None,
            category: category.to_string(),
            parent_id: None,
        }
    }

    fn sample() -> Vec<Bookmark> {
        vec![
            bookmark("1", "GitHub", "https://github.com", "Development"),
            bookmark("2", "Netflix", "https://netflix.com", "Entertainment"),
            bookmark("3", "Figma", "https://figma.com", "Design"),
            bookmark("4", "MDN Web Docs", "https://developer.mozilla.org", "Development"),
        ]
    }

    #[test]
    fn test_empty_query_all_returns_everything_in_order() {
        let bookmarks = sample();
        let result = filter(&bookmarks, "", ALL_CATEGORIES);
        assert_eq!(result.len(), 4);
        let ids: Vec<&str> = result.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let bookmarks = sample();
        let result = filter(&bookmarks, "git", ALL_CATEGORIES);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "GitHub");
    }

    #[test]
    fn test_query_matches_url_and_category() {
        let bookmarks = sample();
        // "mozilla" only appears in the url
        assert_eq!(filter(&bookmarks, "mozilla", ALL_CATEGORIES).len(), 1);
        // "entertain" only appears in the category
        assert_eq!(filter(&bookmarks, "entertain", ALL_CATEGORIES).len(), 1);
    }

    #[test]
    fn test_both_filters_apply() {
        let bookmarks = sample();
        // "docs" matches MDN by title; the category narrow must still apply
        let result = filter(&bookmarks, "docs", "Design");
        assert!(result.is_empty());
        let result = filter(&bookmarks, "docs", "Development");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "4");
    }

    #[test]
    fn test_category_filter_alone() {
        let bookmarks = sample();
        let result = filter(&bookmarks, "", "Development");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_aggregate_sorted_by_count_desc() {
        let bookmarks = sample();
        let counts = aggregate(&bookmarks);
        assert_eq!(counts[0].name, "Development");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_aggregate_ties_keep_first_seen_order() {
        // Categories appear in order B, A, B, A, C with counts 2, 2, 1
        let bookmarks = vec![
            bookmark("1", "b1", "https://b1", "B"),
            bookmark("2", "a1", "https://a1", "A"),
            bookmark("3", "b2", "https://b2", "B"),
            bookmark("4", "a2", "https://a2", "A"),
            bookmark("5", "c1", "https://c1", "C"),
        ];
        let counts = aggregate(&bookmarks);
        let names: Vec<&str> = counts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_aggregate_counts_sum_to_collection_size() {
        let bookmarks = sample();
        let total: usize = aggregate(&bookmarks).iter().map(|c| c.count).sum();
        assert_eq!(total, bookmarks.len());
    }

    #[test]
    fn test_aggregate_empty_collection() {
        assert!(aggregate(&[]).is_empty());
    }
}
