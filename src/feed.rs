//! Public trending feed ordering.

use crate::db::models::TrendingPost;

/// Posts shown on the public trending feed.
pub const TRENDING_FEED_LIMIT: usize = 6;

/// Order by reaction count, most reacted first, keeping the incoming order
/// among ties, and keep at most `limit` posts.
pub fn rank_trending(mut posts: Vec<TrendingPost>, limit: usize) -> Vec<TrendingPost> {
    posts.sort_by(|a, b| b.reactions.len().cmp(&a.reactions.len()));
    posts.truncate(limit);
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ReactionRecord, ReactionType, UserRef};

    fn post(id: &str, reactions: usize) -> TrendingPost {
        TrendingPost {
            id: id.to_string(),
            title: id.to_string(),
            code_snippet: String::new(),
            js_code_snippet: String::new(),
            description: String::new(),
            tags: Vec::new(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            comments: Vec::new(),
            author: UserRef {
                id: "u1".to_string(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            },
            reactions: (0..reactions)
                .map(|i| ReactionRecord {
                    id: format!("{}-r{}", id, i),
                    kind: ReactionType::Like,
                    post_id: id.to_string(),
                    user_id: format!("u{}", i),
                    created_at: "2026-01-01T00:00:00.000Z".to_string(),
                })
                .collect(),
        }
    }

    fn counts(posts: &[TrendingPost]) -> Vec<usize> {
        posts.iter().map(|p| p.reactions.len()).collect()
    }

    #[test]
    fn most_reacted_come_first() {
        let posts = vec![post("a", 2), post("b", 5), post("c", 1)];
        let ranked = rank_trending(posts, TRENDING_FEED_LIMIT);
        assert_eq!(counts(&ranked), vec![5, 2, 1]);
        assert_eq!(ranked[0].id, "b");
    }

    #[test]
    fn ties_keep_incoming_order() {
        let posts = vec![post("a", 1), post("b", 3), post("c", 1)];
        let ranked = rank_trending(posts, TRENDING_FEED_LIMIT);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn feed_is_capped() {
        let posts = (0..9).map(|i| post(&format!("p{}", i), i)).collect();
        let ranked = rank_trending(posts, TRENDING_FEED_LIMIT);
        assert_eq!(ranked.len(), TRENDING_FEED_LIMIT);
        assert_eq!(counts(&ranked), vec![8, 7, 6, 5, 4, 3]);
    }

    #[test]
    fn empty_feed_stays_empty() {
        assert!(rank_trending(Vec::new(), TRENDING_FEED_LIMIT).is_empty());
    }
}
