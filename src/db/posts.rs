use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{
    encode_tags, tags_column, AdminPost, CommentRecord, CommentWithUser, PostDetails, PostRecord,
    ReactionRecord, TrendingPost, UserContact, UserRef,
};
use super::new_id;

pub struct NewPost<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub code_snippet: &'a str,
    pub js_code_snippet: &'a str,
    pub tags: &'a [String],
    pub author_id: &'a str,
}

/// Fields an admin may change. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code_snippet: Option<String>,
    pub js_code_snippet: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub fn exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
}

pub fn find_details(conn: &Connection, id: &str) -> rusqlite::Result<Option<PostDetails>> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", PostDetails::COLUMNS),
        params![id],
        PostDetails::from_row,
    )
    .optional()
}

pub fn create(conn: &Connection, post: &NewPost<'_>) -> rusqlite::Result<PostRecord> {
    let tags = encode_tags(post.tags)?;
    conn.query_row(
        &format!(
            "INSERT INTO posts
                (id, title, description, code_snippet, js_code_snippet, tags, author_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {}",
            PostRecord::COLUMNS
        ),
        params![
            new_id(),
            post.title,
            post.description,
            post.code_snippet,
            post.js_code_snippet,
            tags,
            post.author_id
        ],
        PostRecord::from_row,
    )
}

/// Apply a partial update. Returns `None` when the post does not exist.
pub fn update(
    conn: &Connection,
    id: &str,
    changes: &PostChanges,
) -> rusqlite::Result<Option<PostDetails>> {
    let tags = changes.tags.as_deref().map(encode_tags).transpose()?;
    conn.query_row(
        &format!(
            "UPDATE posts SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                code_snippet = COALESCE(?3, code_snippet),
                js_code_snippet = COALESCE(?4, js_code_snippet),
                tags = COALESCE(?5, tags)
             WHERE id = ?6
             RETURNING {}",
            PostDetails::COLUMNS
        ),
        params![
            changes.title,
            changes.description,
            changes.code_snippet,
            changes.js_code_snippet,
            tags,
            id
        ],
        PostDetails::from_row,
    )
    .optional()
}

/// Delete a post after its comments, favorites and reactions, atomically.
/// Returns false when the post does not exist.
pub fn delete_with_children(conn: &mut Connection, id: &str) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
    tx.execute("DELETE FROM favorites WHERE post_id = ?1", params![id])?;
    tx.execute("DELETE FROM reactions WHERE post_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

fn reactions_by_post(conn: &Connection) -> rusqlite::Result<HashMap<String, Vec<ReactionRecord>>> {
    let mut grouped: HashMap<String, Vec<ReactionRecord>> = HashMap::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM reactions ORDER BY created_at, id",
        ReactionRecord::COLUMNS
    ))?;
    for reaction in stmt.query_map([], ReactionRecord::from_row)? {
        let reaction = reaction?;
        grouped
            .entry(reaction.post_id.clone())
            .or_default()
            .push(reaction);
    }
    Ok(grouped)
}

fn comments_by_post(conn: &Connection) -> rusqlite::Result<HashMap<String, Vec<CommentRecord>>> {
    let mut grouped: HashMap<String, Vec<CommentRecord>> = HashMap::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM comments ORDER BY created_at, id",
        CommentRecord::COLUMNS
    ))?;
    for comment in stmt.query_map([], CommentRecord::from_row)? {
        let comment = comment?;
        grouped
            .entry(comment.post_id.clone())
            .or_default()
            .push(comment);
    }
    Ok(grouped)
}

fn comments_with_users_by_post(
    conn: &Connection,
) -> rusqlite::Result<HashMap<String, Vec<CommentWithUser>>> {
    let mut grouped: HashMap<String, Vec<CommentWithUser>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT c.post_id, c.id, c.content, c.created_at, u.username, u.email
         FROM comments c
         JOIN users u ON u.id = c.user_id
         ORDER BY c.created_at, c.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            CommentWithUser {
                id: row.get(1)?,
                content: row.get(2)?,
                created_at: row.get(3)?,
                user: UserContact {
                    username: row.get(4)?,
                    email: row.get(5)?,
                },
            },
        ))
    })?;
    for row in rows {
        let (post_id, comment) = row?;
        grouped.entry(post_id).or_default().push(comment);
    }
    Ok(grouped)
}

/// Post columns joined with the author, shared by the listing queries.
struct PostWithAuthor {
    id: String,
    title: String,
    code_snippet: String,
    js_code_snippet: String,
    description: String,
    tags: Vec<String>,
    created_at: String,
    author: UserRef,
}

fn posts_with_authors(conn: &Connection) -> rusqlite::Result<Vec<PostWithAuthor>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.title, p.code_snippet, p.js_code_snippet, p.description, p.tags,
                p.created_at, u.id, u.username, u.email
         FROM posts p
         JOIN users u ON u.id = p.author_id
         ORDER BY p.created_at, p.id",
    )?;
    let posts = stmt
        .query_map([], |row| {
            Ok(PostWithAuthor {
                id: row.get(0)?,
                title: row.get(1)?,
                code_snippet: row.get(2)?,
                js_code_snippet: row.get(3)?,
                description: row.get(4)?,
                tags: tags_column(row, 5)?,
                created_at: row.get(6)?,
                author: UserRef {
                    id: row.get(7)?,
                    username: row.get(8)?,
                    email: row.get(9)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

/// Every post with commenters, reactions and author, for the admin content page.
pub fn list_for_admin(conn: &Connection) -> rusqlite::Result<Vec<AdminPost>> {
    let mut comments = comments_with_users_by_post(conn)?;
    let mut reactions = reactions_by_post(conn)?;

    let posts = posts_with_authors(conn)?
        .into_iter()
        .map(|p| AdminPost {
            comments: comments.remove(&p.id).unwrap_or_default(),
            reactions: reactions.remove(&p.id).unwrap_or_default(),
            id: p.id,
            title: p.title,
            code_snippet: p.code_snippet,
            js_code_snippet: p.js_code_snippet,
            description: p.description,
            tags: p.tags,
            created_at: p.created_at,
            author: p.author,
        })
        .collect();
    Ok(posts)
}

/// Every post with raw comments and reactions, in storage order.
pub fn list_with_engagement(conn: &Connection) -> rusqlite::Result<Vec<TrendingPost>> {
    let mut comments = comments_by_post(conn)?;
    let mut reactions = reactions_by_post(conn)?;

    let posts = posts_with_authors(conn)?
        .into_iter()
        .map(|p| TrendingPost {
            comments: comments.remove(&p.id).unwrap_or_default(),
            reactions: reactions.remove(&p.id).unwrap_or_default(),
            id: p.id,
            title: p.title,
            code_snippet: p.code_snippet,
            js_code_snippet: p.js_code_snippet,
            description: p.description,
            tags: p.tags,
            created_at: p.created_at,
            author: p.author,
        })
        .collect();
    Ok(posts)
}

/// Titles of the posts with the most reactions. Ties keep creation order.
pub fn most_reacted_titles(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT p.title
         FROM posts p
         LEFT JOIN reactions r ON r.post_id = p.id
         GROUP BY p.id
         ORDER BY COUNT(r.id) DESC, p.created_at, p.id
         LIMIT ?1",
    )?;
    let titles = stmt
        .query_map(params![limit as i64], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(titles)
}

pub fn newest_titles(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT title FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1",
    )?;
    let titles = stmt
        .query_map(params![limit as i64], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    fn seed_post_with_children(conn: &Connection) {
        insert_user(conn, "u1", "alice", false);
        insert_user(conn, "u2", "bob", false);
        insert_post(conn, "p1", "u1", "Glow button", "2026-01-01T00:00:00.000Z");
        insert_post(conn, "p2", "u1", "Card flip", "2026-01-02T00:00:00.000Z");
        insert_comment(conn, "c1", "p1", "u2");
        insert_comment(conn, "c2", "p1", "u1");
        insert_comment(conn, "c3", "p2", "u2");
        insert_reaction(conn, "r1", "p1", "u2");
        insert_favorite(conn, "f1", "p1", "u2", "2026-01-03T00:00:00.000Z");
    }

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn create_stores_tags_as_json() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        insert_user(&conn, "u1", "alice", false);
        let tags = vec!["css".to_string(), "animation".to_string()];
        let post = create(
            &conn,
            &NewPost {
                title: "Pulse",
                description: "A pulsing dot",
                code_snippet: ".dot{}",
                js_code_snippet: "",
                tags: &tags,
                author_id: "u1",
            },
        )
        .unwrap();
        assert_eq!(post.tags, tags);

        let details = find_details(&conn, &post.id).unwrap().unwrap();
        assert_eq!(details.title, "Pulse");
        assert_eq!(details.tags, tags);
    }

    #[test]
    fn find_details_of_missing_post_is_none() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(find_details(&conn, "ghost").unwrap().is_none());
        assert!(!exists(&conn, "ghost").unwrap());
    }

    #[test]
    fn update_keeps_fields_that_are_not_given() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        seed_post_with_children(&conn);

        let changes = PostChanges {
            title: Some("Glow button v2".into()),
            tags: Some(vec!["ui".into()]),
            ..Default::default()
        };
        let updated = update(&conn, "p1", &changes).unwrap().unwrap();
        assert_eq!(updated.title, "Glow button v2");
        assert_eq!(updated.tags, vec!["ui".to_string()]);
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.code_snippet, "code");
    }

    #[test]
    fn update_of_missing_post_is_none() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(update(&conn, "ghost", &PostChanges::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn delete_removes_all_children() {
        let pool = migrated_pool();
        let mut conn = pool.get().unwrap();
        seed_post_with_children(&conn);

        assert!(delete_with_children(&mut conn, "p1").unwrap());

        assert_eq!(count(&conn, "SELECT COUNT(*) FROM comments WHERE post_id = 'p1'"), 0);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM favorites WHERE post_id = 'p1'"), 0);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM reactions WHERE post_id = 'p1'"), 0);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM posts WHERE id = 'p1'"), 0);
        // Other posts are untouched
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM comments WHERE post_id = 'p2'"), 1);
    }

    #[test]
    fn delete_of_missing_post_reports_false() {
        let pool = migrated_pool();
        let mut conn = pool.get().unwrap();
        assert!(!delete_with_children(&mut conn, "ghost").unwrap());
    }

    #[test]
    fn admin_listing_nests_comments_reactions_and_author() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        seed_post_with_children(&conn);

        let posts = list_for_admin(&conn).unwrap();
        assert_eq!(posts.len(), 2);
        let first = &posts[0];
        assert_eq!(first.id, "p1");
        assert_eq!(first.author.username, "alice");
        assert_eq!(first.comments.len(), 2);
        assert_eq!(first.comments[0].user.username, "bob");
        assert_eq!(first.reactions.len(), 1);
        assert!(posts[1].reactions.is_empty());
    }

    #[test]
    fn engagement_listing_keeps_raw_children() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        seed_post_with_children(&conn);

        let posts = list_with_engagement(&conn).unwrap();
        let p2 = posts.iter().find(|p| p.id == "p2").unwrap();
        assert_eq!(p2.comments.len(), 1);
        assert_eq!(p2.comments[0].user_id, "u2");
    }

    #[test]
    fn most_reacted_orders_by_reaction_count() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        insert_user(&conn, "u1", "alice", false);
        insert_user(&conn, "u2", "bob", false);
        insert_post(&conn, "p1", "u1", "Quiet", "2026-01-01T00:00:00.000Z");
        insert_post(&conn, "p2", "u1", "Loud", "2026-01-02T00:00:00.000Z");
        insert_reaction(&conn, "r1", "p2", "u1");
        insert_reaction(&conn, "r2", "p2", "u2");

        assert_eq!(most_reacted_titles(&conn, 5).unwrap(), vec!["Loud", "Quiet"]);
        assert_eq!(most_reacted_titles(&conn, 1).unwrap(), vec!["Loud"]);
    }

    #[test]
    fn newest_titles_are_most_recent_first() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        insert_user(&conn, "u1", "alice", false);
        insert_post(&conn, "p1", "u1", "Old", "2026-01-01T00:00:00.000Z");
        insert_post(&conn, "p2", "u1", "New", "2026-02-01T00:00:00.000Z");

        assert_eq!(newest_titles(&conn, 5).unwrap(), vec!["New", "Old"]);
    }

    #[test]
    fn title_lists_are_empty_without_posts() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(most_reacted_titles(&conn, 5).unwrap().is_empty());
        assert!(newest_titles(&conn, 5).unwrap().is_empty());
    }
}
