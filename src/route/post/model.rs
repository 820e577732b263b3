use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::tags;

/// Selects posts joined with their comma-joined tag names.
///
/// Append a `WHERE` clause, then [`GROUP_BY`].
pub const SELECT: &str = r"
	SELECT
		post.id,
		post.author_id,
		post.title,
		post.content,
		post.published,
		post.published_at,
		post.created_at,
		post.updated_at,
		group_concat(tag.name, ',') AS tags
	FROM post
	LEFT JOIN post_tag ON post_tag.post_id = post.id
	LEFT JOIN tag ON tag.id = post_tag.tag_id
";

/// Groups the rows of [`SELECT`] back into posts, newest first.
pub const GROUP_BY: &str = r"
	GROUP BY post.id
	ORDER BY post.created_at DESC, post.rowid DESC
";

#[inline]
fn yes() -> bool {
	true
}

/// A single post, written by a user.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The user that wrote the post.
	pub author_id: Uuid,
	pub title: String,
	pub content: String,
	/// Drafts (unpublished posts) are only visible to their author.
	pub published: bool,
	/// When the post was first published.
	pub published_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// The names of the post's tags, sorted.
	pub tags: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
	pub id: Uuid,
	pub author_id: Uuid,
	pub title: String,
	pub content: String,
	pub published: bool,
	pub published_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub tags: Option<String>,
}

impl From<PostRow> for Post {
	fn from(row: PostRow) -> Self {
		Self {
			id: row.id,
			author_id: row.author_id,
			title: row.title,
			content: row.content,
			published: row.published,
			published_at: row.published_at,
			created_at: row.created_at,
			updated_at: row.updated_at,
			tags: row
				.tags
				.as_deref()
				.map(tags::parse)
				.unwrap_or_default()
				.into_iter()
				.collect(),
		}
	}
}

impl Post {
	/// Whether the post can be seen by the given user (or an anonymous one).
	pub fn visible_to(&self, user_id: Option<Uuid>) -> bool {
		self.published || user_id == Some(self.author_id)
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreatePostInput {
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	pub content: String,
	/// Defaults to `true`. Set to `false` to save a draft.
	#[serde(default = "yes")]
	pub published: bool,
	/// Tag names separated by commas, e.g. `"rust, web"`.
	#[serde(default)]
	#[validate(custom(function = "tags::validate"))]
	pub tags: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdatePostInput {
	#[validate(length(min = 1, max = 200))]
	pub title: Option<String>,
	pub content: Option<String>,
	pub published: Option<bool>,
	/// Replaces all tags of the post. An empty string removes them.
	#[validate(custom(function = "tags::validate"))]
	pub tags: Option<String>,
}
