use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A comment left on a post.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The post the comment belongs to.
	#[serde(skip_deserializing)]
	pub post_id: Uuid,
	/// The user that wrote the comment.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The text of the comment, at least two characters long.
	#[validate(length(min = 2, message = "Comment is too short."))]
	pub content: String,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
	#[serde(skip_deserializing)]
	pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	fn create(content: &str) -> CreateCommentInput {
		CreateCommentInput {
			content: content.into(),
		}
	}

	#[test]
	fn test_comment_minimum_length() {
		assert!(create("").validate().is_err());
		assert!(create("a").validate().is_err());
		assert!(create("ok").validate().is_ok());
		assert!(create("é!").validate().is_ok());
	}

	#[test]
	fn test_comment_too_short_message() {
		let errors = create("a").validate().unwrap_err();
		let errors = errors.field_errors();

		assert_eq!(
			errors["content"][0].message.as_deref(),
			Some("Comment is too short.")
		);
	}

	#[test]
	fn test_update_without_content_is_valid() {
		assert!(UpdateCommentInput { content: None }.validate().is_ok());
		assert!(UpdateCommentInput {
			content: Some("a".into())
		}
		.validate()
		.is_err());
	}
}
