use schemars::JsonSchema;
use serde::Serialize;

/// A tag and the number of published posts carrying it.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Tag {
	pub id: i64,
	/// The unique, case-sensitive name of the tag.
	pub name: String,
	/// The number of published posts with this tag.
	pub posts: i64,
}
