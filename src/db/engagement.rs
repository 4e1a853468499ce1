use rusqlite::{params, Connection};

use super::models::{
    CommentRecord, FavoriteActivity, PostSummary, ReactedPost, ReactionActivity, ReactionRecord,
    ReactionType, UserRef,
};
use super::new_id;

// --- Comments ---

pub fn create_comment(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
    content: &str,
) -> rusqlite::Result<CommentRecord> {
    conn.query_row(
        &format!(
            "INSERT INTO comments (id, content, post_id, user_id) VALUES (?1, ?2, ?3, ?4)
             RETURNING {}",
            CommentRecord::COLUMNS
        ),
        params![new_id(), content, post_id, user_id],
        CommentRecord::from_row,
    )
}

/// Returns false when no such comment exists.
pub fn delete_comment(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// --- Reactions ---

/// Set the user's reaction on a post, replacing any earlier kind.
pub fn upsert_reaction(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
    kind: ReactionType,
) -> rusqlite::Result<ReactionRecord> {
    conn.query_row(
        &format!(
            "INSERT INTO reactions (id, type, post_id, user_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(post_id, user_id) DO UPDATE SET
               type = excluded.type,
               created_at = excluded.created_at
             RETURNING {}",
            ReactionRecord::COLUMNS
        ),
        params![new_id(), kind, post_id, user_id],
        ReactionRecord::from_row,
    )
}

pub fn remove_reaction(conn: &Connection, post_id: &str, user_id: &str) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM reactions WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;
    Ok(deleted > 0)
}

/// Every reaction with the reacting user and the post it targets.
pub fn list_reaction_activity(conn: &Connection) -> rusqlite::Result<Vec<ReactionActivity>> {
    let mut stmt = conn.prepare(
        "SELECT r.type, r.created_at,
                u.id, u.username, u.email,
                p.id, p.title, p.description,
                a.id, a.username, a.email
         FROM reactions r
         JOIN users u ON u.id = r.user_id
         JOIN posts p ON p.id = r.post_id
         JOIN users a ON a.id = p.author_id
         ORDER BY r.created_at, r.id",
    )?;
    let reactions = stmt
        .query_map([], |row| {
            Ok(ReactionActivity {
                kind: row.get(0)?,
                created_at: row.get(1)?,
                user: UserRef {
                    id: row.get(2)?,
                    username: row.get(3)?,
                    email: row.get(4)?,
                },
                post: ReactedPost {
                    id: row.get(5)?,
                    title: row.get(6)?,
                    description: row.get(7)?,
                    author: UserRef {
                        id: row.get(8)?,
                        username: row.get(9)?,
                        email: row.get(10)?,
                    },
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(reactions)
}

// --- Favorites ---

/// Flip the favorite state. Returns true when the post is now a favorite.
pub fn toggle_favorite(
    conn: &mut Connection,
    post_id: &str,
    user_id: &str,
) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    let removed = tx.execute(
        "DELETE FROM favorites WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;
    if removed == 0 {
        tx.execute(
            "INSERT INTO favorites (id, post_id, user_id) VALUES (?1, ?2, ?3)",
            params![new_id(), post_id, user_id],
        )?;
    }
    tx.commit()?;
    Ok(removed == 0)
}

/// Every favorite with user and post, newest first.
pub fn list_favorite_activity(conn: &Connection) -> rusqlite::Result<Vec<FavoriteActivity>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.created_at,
                u.id, u.username, u.email,
                p.id, p.title, p.description
         FROM favorites f
         JOIN users u ON u.id = f.user_id
         JOIN posts p ON p.id = f.post_id
         ORDER BY f.created_at DESC, f.id DESC",
    )?;
    let favorites = stmt
        .query_map([], |row| {
            Ok(FavoriteActivity {
                id: row.get(0)?,
                created_at: row.get(1)?,
                user: UserRef {
                    id: row.get(2)?,
                    username: row.get(3)?,
                    email: row.get(4)?,
                },
                post: PostSummary {
                    id: row.get(5)?,
                    title: row.get(6)?,
                    description: row.get(7)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(favorites)
}
