//! Request payload schemas. Every field defaults when absent so that a
//! missing field is reported by validation rather than by the JSON decoder.

use serde::Deserialize;
use validator::Validate;

use crate::db::models::ReactionType;
use crate::db::posts::PostChanges;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description must be between 1 and 500 characters"
    ))]
    pub description: String,
    #[validate(length(min = 1, message = "Code snippet is required"))]
    pub code_snippet: String,
    pub js_code_snippet: String,
    #[validate(length(max = 10, message = "A post can have at most 10 tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description must be between 1 and 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Code snippet cannot be empty"))]
    pub code_snippet: Option<String>,
    pub js_code_snippet: Option<String>,
    #[validate(length(max = 10, message = "A post can have at most 10 tags"))]
    pub tags: Option<Vec<String>>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        PostChanges {
            title: req.title,
            description: req.description,
            code_snippet: req.code_snippet,
            js_code_snippet: req.js_code_snippet,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Message must be between 1 and 2000 characters"
    ))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_fields<T: Validate>(value: &T) -> Vec<String> {
        let mut fields: Vec<String> = value
            .validate()
            .unwrap_err()
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn login_accepts_well_formed_credentials() {
        let req = LoginRequest {
            email: "admin@styleshare.dev".into(),
            password: "hunter22".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_login_reports_both_fields() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(failing_fields(&req), vec!["email", "password"]);
    }

    #[test]
    fn signup_rejects_short_username() {
        let req = SignupRequest {
            email: "a@example.com".into(),
            username: "ab".into(),
            password: "hunter22".into(),
        };
        assert_eq!(failing_fields(&req), vec!["username"]);
    }

    #[test]
    fn create_post_reads_camel_case_fields() {
        let req: CreatePostRequest = serde_json::from_str(
            r#"{"title":"Glow","description":"d","codeSnippet":".a{}",
                "jsCodeSnippet":"x()","tags":["css"]}"#,
        )
        .unwrap();
        assert_eq!(req.code_snippet, ".a{}");
        assert_eq!(req.js_code_snippet, "x()");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_post_limits_tag_count() {
        let req = CreatePostRequest {
            title: "Glow".into(),
            description: "d".into(),
            code_snippet: "c".into(),
            js_code_snippet: String::new(),
            tags: (0..11).map(|i| format!("tag{}", i)).collect(),
        };
        assert_eq!(failing_fields(&req), vec!["tags"]);
    }

    #[test]
    fn update_allows_absent_fields_but_not_empty_title() {
        let empty: UpdatePostRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());

        let blank_title = UpdatePostRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(failing_fields(&blank_title), vec!["title"]);
    }

    #[test]
    fn update_request_converts_to_changes() {
        let req = UpdatePostRequest {
            description: Some("new".into()),
            tags: Some(vec!["ui".into()]),
            ..Default::default()
        };
        let changes = PostChanges::from(req);
        assert!(changes.title.is_none());
        assert_eq!(changes.description.as_deref(), Some("new"));
        assert_eq!(changes.tags, Some(vec!["ui".to_string()]));
    }

    #[test]
    fn reaction_request_parses_type() {
        let req: ReactionRequest = serde_json::from_str(r#"{"type":"Celebrate"}"#).unwrap();
        assert_eq!(req.kind, ReactionType::Celebrate);
        assert!(serde_json::from_str::<ReactionRequest>(r#"{"type":"Angry"}"#).is_err());
    }

    #[test]
    fn contact_requires_valid_email() {
        let req = ContactRequest {
            name: "Dana".into(),
            email: "dana".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        };
        assert_eq!(failing_fields(&req), vec!["email"]);
    }
}
