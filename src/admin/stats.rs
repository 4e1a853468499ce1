//! Point-in-time counts and derived lists for the dashboard and report.
//!
//! Each figure is its own query with no surrounding transaction, so totals
//! taken while writes are in flight may not agree with each other.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::models::Timestamp;
use crate::db::posts;

/// Number of titles in each report list.
pub const REPORT_LIST_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Users,
    Posts,
    Comments,
    Reactions,
    ContactMessages,
    Favorites,
}

impl Entity {
    fn table(self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Posts => "posts",
            Entity::Comments => "comments",
            Entity::Reactions => "reactions",
            Entity::ContactMessages => "contact_messages",
            Entity::Favorites => "favorites",
        }
    }
}

pub fn count_rows(conn: &Connection, entity: Entity) -> rusqlite::Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", entity.table()),
        [],
        |row| row.get(0),
    )
}

pub fn creation_times(conn: &Connection, entity: Entity) -> rusqlite::Result<Vec<Timestamp>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT created_at FROM {} ORDER BY created_at",
        entity.table()
    ))?;
    let times = stmt
        .query_map([], |row| {
            Ok(Timestamp {
                created_at: row.get(0)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(times)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub total_reactions: i64,
    pub contact_messages: i64,
    pub favorites_posts: i64,
}

pub fn collect_stats(conn: &Connection) -> rusqlite::Result<AdminStats> {
    Ok(AdminStats {
        total_users: count_rows(conn, Entity::Users)?,
        total_posts: count_rows(conn, Entity::Posts)?,
        total_comments: count_rows(conn, Entity::Comments)?,
        total_reactions: count_rows(conn, Entity::Reactions)?,
        contact_messages: count_rows(conn, Entity::ContactMessages)?,
        favorites_posts: count_rows(conn, Entity::Favorites)?,
    })
}

/// Raw creation times per entity; bucketing is left to the client.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSeries {
    pub users: Vec<Timestamp>,
    pub posts: Vec<Timestamp>,
    pub comments: Vec<Timestamp>,
    pub favorites: Vec<Timestamp>,
    pub contacts: Vec<Timestamp>,
    pub reactions: Vec<Timestamp>,
}

pub fn collect_graph_series(conn: &Connection) -> rusqlite::Result<GraphSeries> {
    Ok(GraphSeries {
        users: creation_times(conn, Entity::Users)?,
        posts: creation_times(conn, Entity::Posts)?,
        comments: creation_times(conn, Entity::Comments)?,
        favorites: creation_times(conn, Entity::Favorites)?,
        contacts: creation_times(conn, Entity::ContactMessages)?,
        reactions: creation_times(conn, Entity::Reactions)?,
    })
}

/// Everything the PDF report prints.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub date: NaiveDate,
    pub stats: AdminStats,
    pub trending_titles: Vec<String>,
    pub newest_titles: Vec<String>,
}

pub fn collect_report_snapshot(
    conn: &Connection,
    date: NaiveDate,
) -> rusqlite::Result<ReportSnapshot> {
    Ok(ReportSnapshot {
        date,
        stats: collect_stats(conn)?,
        trending_titles: posts::most_reacted_titles(conn, REPORT_LIST_LIMIT)?,
        newest_titles: posts::newest_titles(conn, REPORT_LIST_LIMIT)?,
    })
}
