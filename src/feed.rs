//! List and detail derivations. Pure functions over whatever the cache currently holds.

use feruca::Collator;
use std::cmp::Reverse;

use crate::models::{SortOption, Story};

pub const RELATED_LIMIT: usize = 3;

/// Case-insensitive substring match against the title or any tag. An empty query matches.
pub fn matches_query(story: &Story, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    story.title.to_lowercase().contains(&query)
        || story
            .category
            .iter()
            .any(|tag| tag.to_lowercase().contains(&query))
}

/// Stable sort, so stories with equal keys keep their incoming order. Unparseable dates sort as
/// the oldest.
pub fn sort_stories(stories: &mut [&Story], sort: SortOption) {
    match sort {
        SortOption::Latest => stories.sort_by_cached_key(|s| Reverse(s.published_at())),
        SortOption::Oldest => stories.sort_by_cached_key(|s| s.published_at()),
        // CLDR root collation: accents are secondary, lowercase before uppercase on ties
        SortOption::Alphabetical => {
            let mut collator = Collator::default();
            stories.sort_by(|a, b| collator.collate(a.title.as_str(), b.title.as_str()));
        }
    }
}

/// Stories for the side panel: filtered by `query`, then ordered by `sort`.
pub fn visible_stories<'a>(stories: &'a [Story], query: &str, sort: SortOption) -> Vec<&'a Story> {
    let mut visible: Vec<&Story> = stories
        .iter()
        .filter(|story| matches_query(story, query))
        .collect();
    sort_stories(&mut visible, sort);
    visible
}

/// Up to three other stories sharing at least one exact tag with `current`, in collection order.
pub fn related_stories<'a>(current: &Story, all: &'a [Story]) -> Vec<&'a Story> {
    all.iter()
        .filter(|story| story.id != current.id)
        .filter(|story| story.category.iter().any(|tag| current.category.contains(tag)))
        .take(RELATED_LIMIT)
        .collect()
}

pub fn result_count_label(count: usize) -> String {
    if count == 1 {
        "1 Result".to_string()
    } else {
        format!("{count} Results")
    }
}
