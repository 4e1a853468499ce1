use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// The six kinds of reaction a user can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    Like,
    Celebrate,
    Support,
    Love,
    Insightful,
    Funny,
}

impl ReactionType {
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Celebrate,
        ReactionType::Support,
        ReactionType::Love,
        ReactionType::Insightful,
        ReactionType::Funny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "Like",
            ReactionType::Celebrate => "Celebrate",
            ReactionType::Support => "Support",
            ReactionType::Love => "Love",
            ReactionType::Insightful => "Insightful",
            ReactionType::Funny => "Funny",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown reaction type: {0}")]
pub struct UnknownReactionType(pub String);

impl FromStr for ReactionType {
    type Err = UnknownReactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReactionType(s.to_string()))
    }
}

impl ToSql for ReactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Decode the JSON array stored in `posts.tags`.
pub(crate) fn tags_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Encode tags for `posts.tags`, as a bind-time conversion failure on error.
pub(crate) fn encode_tags(tags: &[String]) -> rusqlite::Result<String> {
    serde_json::to_string(tags)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

// --- Rows ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub blocked: bool,
    pub created_at: String,
}

impl User {
    pub(crate) const COLUMNS: &'static str =
        "id, email, username, password_hash, is_admin, blocked, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            password_hash: row.get(3)?,
            is_admin: row.get(4)?,
            blocked: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub code_snippet: String,
    pub js_code_snippet: String,
    pub tags: Vec<String>,
    pub author_id: String,
    pub created_at: String,
}

impl PostRecord {
    pub(crate) const COLUMNS: &'static str =
        "id, title, description, code_snippet, js_code_snippet, tags, author_id, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PostRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            code_snippet: row.get(3)?,
            js_code_snippet: row.get(4)?,
            tags: tags_column(row, 5)?,
            author_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

/// Editable fields of a post, as returned by the detail and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetails {
    pub id: String,
    pub title: String,
    pub code_snippet: String,
    pub js_code_snippet: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl PostDetails {
    pub(crate) const COLUMNS: &'static str =
        "id, title, code_snippet, js_code_snippet, description, tags";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PostDetails {
            id: row.get(0)?,
            title: row.get(1)?,
            code_snippet: row.get(2)?,
            js_code_snippet: row.get(3)?,
            description: row.get(4)?,
            tags: tags_column(row, 5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub post_id: String,
    pub user_id: String,
}

impl CommentRecord {
    pub(crate) const COLUMNS: &'static str = "id, content, created_at, post_id, user_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CommentRecord {
            id: row.get(0)?,
            content: row.get(1)?,
            created_at: row.get(2)?,
            post_id: row.get(3)?,
            user_id: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub created_at: String,
    pub post_id: String,
    pub user_id: String,
}

impl ReactionRecord {
    pub(crate) const COLUMNS: &'static str = "id, type, created_at, post_id, user_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReactionRecord {
            id: row.get(0)?,
            kind: row.get(1)?,
            created_at: row.get(2)?,
            post_id: row.get(3)?,
            user_id: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamp {
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdOnly {
    pub id: String,
}

// --- Nested views ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserContact {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// A non-admin user with everything the moderation table shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub blocked: bool,
    pub posts: Vec<PostRecord>,
    pub created_at: String,
    pub comments: Vec<CommentRecord>,
    pub following: Vec<IdOnly>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub user: UserContact,
}

/// A post as listed on the admin content page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPost {
    pub id: String,
    pub title: String,
    pub code_snippet: String,
    pub js_code_snippet: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub comments: Vec<CommentWithUser>,
    pub reactions: Vec<ReactionRecord>,
    pub author: UserRef,
}

/// A post with its raw comments and reactions, input to trending ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingPost {
    pub id: String,
    pub title: String,
    pub code_snippet: String,
    pub js_code_snippet: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub comments: Vec<CommentRecord>,
    pub author: UserRef,
    pub reactions: Vec<ReactionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactedPost {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: UserRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionActivity {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub created_at: String,
    pub user: UserRef,
    pub post: ReactedPost,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteActivity {
    pub id: String,
    pub created_at: String,
    pub user: UserRef,
    pub post: PostSummary,
}
