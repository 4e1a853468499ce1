use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{CommentRecord, IdOnly, ModeratedUser, PostRecord, User};
use super::new_id;

pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

pub fn find_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        params![id],
        User::from_row,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS),
        params![email],
        User::from_row,
    )
    .optional()
}

pub fn find_admin_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM users WHERE email = ?1 AND is_admin = 1",
            User::COLUMNS
        ),
        params![email],
        User::from_row,
    )
    .optional()
}

pub fn email_or_username_taken(
    conn: &Connection,
    email: &str,
    username: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1 OR username = ?2",
        params![email, username],
        |row| row.get(0),
    )
}

pub fn create(conn: &Connection, user: &NewUser<'_>) -> rusqlite::Result<User> {
    let id = new_id();
    conn.query_row(
        &format!(
            "INSERT INTO users (id, email, username, password_hash, is_admin)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {}",
            User::COLUMNS
        ),
        params![
            id,
            user.email,
            user.username,
            user.password_hash,
            user.is_admin
        ],
        User::from_row,
    )
}

/// Create the configured admin account unless a user with that email exists.
/// Returns true when a row was inserted.
pub fn ensure_admin(conn: &Connection, admin: &NewUser<'_>) -> rusqlite::Result<bool> {
    if find_by_email(conn, admin.email)?.is_some() {
        return Ok(false);
    }
    create(
        conn,
        &NewUser {
            is_admin: true,
            ..*admin
        },
    )?;
    Ok(true)
}

/// Set the blocked flag. Returns the username, or `None` when no such user.
pub fn set_blocked(conn: &Connection, id: &str, blocked: bool) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "UPDATE users SET blocked = ?1 WHERE id = ?2 RETURNING username",
        params![blocked, id],
        |row| row.get(0),
    )
    .optional()
}

/// All non-admin users with their posts, comments and follow edges.
pub fn list_moderated(conn: &Connection) -> rusqlite::Result<Vec<ModeratedUser>> {
    let mut posts_by_author: HashMap<String, Vec<PostRecord>> = HashMap::new();
    {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts ORDER BY created_at, id",
            PostRecord::COLUMNS
        ))?;
        let rows = stmt.query_map([], PostRecord::from_row)?;
        for post in rows {
            let post = post?;
            posts_by_author
                .entry(post.author_id.clone())
                .or_default()
                .push(post);
        }
    }

    let mut comments_by_user: HashMap<String, Vec<CommentRecord>> = HashMap::new();
    {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments ORDER BY created_at, id",
            CommentRecord::COLUMNS
        ))?;
        let rows = stmt.query_map([], CommentRecord::from_row)?;
        for comment in rows {
            let comment = comment?;
            comments_by_user
                .entry(comment.user_id.clone())
                .or_default()
                .push(comment);
        }
    }

    let mut following_by_user: HashMap<String, Vec<IdOnly>> = HashMap::new();
    {
        let mut stmt = conn.prepare("SELECT id, follower_id FROM follows ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for edge in rows {
            let (id, follower_id) = edge?;
            following_by_user
                .entry(follower_id)
                .or_default()
                .push(IdOnly { id });
        }
    }

    let mut stmt = conn.prepare(
        "SELECT id, username, email, blocked, created_at
         FROM users
         WHERE is_admin = 0
         ORDER BY created_at, id",
    )?;
    let users = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .map(|r| {
            r.map(|(id, username, email, blocked, created_at)| ModeratedUser {
                posts: posts_by_author.remove(&id).unwrap_or_default(),
                comments: comments_by_user.remove(&id).unwrap_or_default(),
                following: following_by_user.remove(&id).unwrap_or_default(),
                id,
                username,
                email,
                blocked,
                created_at,
            })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(users)
}
