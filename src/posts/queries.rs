//! Read-side queries over the post list.
//!
//! The record store returns the full list; pagination, search, related
//! selection, and popularity ranking all happen here, in memory.

use crate::stores::PostRecord;

/// How many related posts accompany a single-post view.
pub const RELATED_COUNT: usize = 3;

/// How many posts the popular listing returns.
pub const POPULAR_COUNT: usize = 6;

/// One page of posts.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
    pub posts: Vec<PostRecord>,
}

/// Sort posts into their canonical order (ascending row index).
pub fn sort_canonical(posts: &mut [PostRecord]) {
    posts.sort_by_key(|post| post.row_index);
}

/// Slice one page out of `posts`.
///
/// `page` is 1-based; `limit` must be at least 1. A page past the end
/// (including offsets too large to compute) yields an empty post list
/// with the totals intact. `page` arrives straight from the query
/// string, so the offset math must hold for any `usize`.
pub fn paginate(posts: &[PostRecord], page: usize, limit: usize) -> Page {
    debug_assert!(limit >= 1);
    let total_posts = posts.len();
    let total_pages = total_posts.div_ceil(limit);
    let slice = page
        .saturating_sub(1)
        .checked_mul(limit)
        .and_then(|start| posts.get(start..total_posts.min(start.saturating_add(limit))))
        .unwrap_or_default();
    Page {
        page,
        total_pages,
        total_posts,
        posts: slice.to_vec(),
    }
}

/// Filter posts whose title or labels contain `query`, case-insensitively.
pub fn search(posts: &[PostRecord], query: &str) -> Vec<PostRecord> {
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.labels.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Find the post with slug `slug` along with up to [`RELATED_COUNT`]
/// related posts.
///
/// Related means sharing at least one label (trimmed, case-insensitive);
/// when fewer than [`RELATED_COUNT`] share a label the remainder is padded
/// from the other posts in canonical order.
pub fn find_with_related(posts: &[PostRecord], slug: &str) -> Option<(PostRecord, Vec<PostRecord>)> {
    let post = posts.iter().find(|post| post.post_url == slug)?.clone();
    let labels = label_set(&post.labels);

    let mut related: Vec<PostRecord> = posts
        .iter()
        .filter(|other| {
            other.post_url != slug
                && label_set(&other.labels)
                    .iter()
                    .any(|label| labels.contains(label))
        })
        .cloned()
        .collect();

    if related.len() < RELATED_COUNT {
        let padding: Vec<PostRecord> = posts
            .iter()
            .filter(|other| {
                other.post_url != slug
                    && !related.iter().any(|r| r.row_index == other.row_index)
            })
            .cloned()
            .collect();
        related.extend(padding);
    }
    related.truncate(RELATED_COUNT);

    Some((post, related))
}

/// The top [`POPULAR_COUNT`] posts by view count, descending.
pub fn popular(posts: &[PostRecord]) -> Vec<PostRecord> {
    let mut ranked = posts.to_vec();
    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked.truncate(POPULAR_COUNT);
    ranked
}

fn label_set(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: u32, slug: &str, labels: &str, views: u64) -> PostRecord {
        PostRecord {
            row_index: row,
            title: format!("Title {slug}"),
            post_url: slug.to_string(),
            url: None,
            video_link: String::new(),
            feature_image: String::new(),
            labels: labels.to_string(),
            author: "admin".to_string(),
            published: String::new(),
            views,
        }
    }

    fn sample() -> Vec<PostRecord> {
        vec![
            record(1, "alps", "travel, hiking", 10),
            record(2, "pasta", "food, italy", 50),
            record(3, "dolomites", "travel, climbing", 5),
            record(4, "sushi", "food, japan", 30),
            record(5, "sahara", "travel, desert", 70),
        ]
    }

    #[test]
    fn test_paginate_first_page() {
        let page = paginate(&sample(), 1, 2);
        assert_eq!(page.total_posts, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].post_url, "alps");
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let page = paginate(&sample(), 3, 2);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].post_url, "sahara");
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let page = paginate(&sample(), 9, 2);
        assert!(page.posts.is_empty());
        assert_eq!(page.total_posts, 5);
    }

    #[test]
    fn test_paginate_huge_page_is_empty() {
        // Offsets beyond what `page * limit` can represent behave like
        // any other past-the-end page instead of overflowing.
        let page = paginate(&sample(), usize::MAX, 12);
        assert!(page.posts.is_empty());
        assert_eq!(page.total_posts, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let hits = search(&sample(), "PASTA");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post_url, "pasta");
    }

    #[test]
    fn test_search_matches_labels() {
        let hits = search(&sample(), "food");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        assert!(search(&sample(), "nonexistent").is_empty());
    }

    #[test]
    fn test_related_prefers_shared_labels() {
        let posts = sample();
        let (post, related) = find_with_related(&posts, "alps").unwrap();
        assert_eq!(post.row_index, 1);
        // Two other travel posts share a label; one padding entry follows.
        assert_eq!(related.len(), 3);
        assert_eq!(related[0].post_url, "dolomites");
        assert_eq!(related[1].post_url, "sahara");
    }

    #[test]
    fn test_related_pads_from_other_posts() {
        let posts = vec![
            record(1, "alone", "unique-label", 0),
            record(2, "other-a", "x", 0),
            record(3, "other-b", "y", 0),
        ];
        let (_, related) = find_with_related(&posts, "alone").unwrap();
        assert_eq!(related.len(), 2);
    }

    #[test]
    fn test_related_excludes_the_post_itself() {
        let posts = sample();
        let (_, related) = find_with_related(&posts, "pasta").unwrap();
        assert!(related.iter().all(|post| post.post_url != "pasta"));
    }

    #[test]
    fn test_unknown_slug_is_none() {
        assert!(find_with_related(&sample(), "ghost").is_none());
    }

    #[test]
    fn test_popular_sorts_by_views_descending() {
        let top = popular(&sample());
        assert_eq!(top[0].post_url, "sahara");
        assert_eq!(top[1].post_url, "pasta");
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_popular_truncates_to_six() {
        let mut posts = sample();
        posts.push(record(6, "a", "", 1));
        posts.push(record(7, "b", "", 2));
        assert_eq!(popular(&posts).len(), POPULAR_COUNT);
    }

    #[test]
    fn test_sort_canonical_orders_by_row_index() {
        let mut posts = vec![record(3, "c", "", 0), record(1, "a", "", 0)];
        sort_canonical(&mut posts);
        assert_eq!(posts[0].row_index, 1);
    }
}
