//! The comma-separated tag field of a post.

use std::collections::BTreeSet;

use sqlx::SqliteConnection;
use uuid::Uuid;
use validator::ValidationError;

/// The longest tag name that can be stored.
pub const MAX_TAG_LENGTH: usize = 50;

/// Splits a comma-separated list into its distinct, trimmed, non-empty names.
///
/// ```rust
/// assert_eq!(parse("a, b ,a"), BTreeSet::from(["a".into(), "b".into()]));
/// ```
pub fn parse(input: &str) -> BTreeSet<String> {
	input
		.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(str::to_owned)
		.collect()
}

pub fn validate(input: &str) -> Result<(), ValidationError> {
	if parse(input)
		.iter()
		.any(|name| name.chars().count() > MAX_TAG_LENGTH)
	{
		let mut error = ValidationError::new("tag_too_long");
		error.message = Some("Each tag can be at most 50 characters long.".into());
		error.add_param("max".into(), &MAX_TAG_LENGTH);

		return Err(error);
	}

	Ok(())
}

/// Replaces the tags of a post, creating tags that do not exist yet.
///
/// Run this inside the transaction that writes the post.
pub async fn assign(
	conn: &mut SqliteConnection,
	post_id: Uuid,
	names: &BTreeSet<String>,
) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM post_tag WHERE post_id = ?")
		.bind(post_id)
		.execute(&mut *conn)
		.await?;

	for name in names {
		sqlx::query("INSERT INTO tag (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
			.bind(name)
			.execute(&mut *conn)
			.await?;

		sqlx::query(
			r"
				INSERT INTO post_tag (post_id, tag_id)
				SELECT ?, id FROM tag WHERE name = ?
			",
		)
		.bind(post_id)
		.bind(name)
		.execute(&mut *conn)
		.await?;
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use std::collections::BTreeSet;

	use super::*;

	fn set(names: &[&str]) -> BTreeSet<String> {
		names.iter().map(|name| (*name).to_owned()).collect()
	}

	#[test]
	fn test_parse_trims_and_deduplicates() {
		assert_eq!(parse("a, b ,a"), set(&["a", "b"]));
		assert_eq!(parse(" rust ,web,  rust"), set(&["rust", "web"]));
	}

	#[test]
	fn test_parse_drops_empty_segments() {
		assert_eq!(parse(""), set(&[]));
		assert_eq!(parse(" , ,,"), set(&[]));
		assert_eq!(parse(",news,"), set(&["news"]));
	}

	#[test]
	fn test_parse_is_case_sensitive() {
		assert_eq!(parse("Rust, rust"), set(&["Rust", "rust"]));
	}

	#[test]
	fn test_validate_tag_length() {
		let long = "a".repeat(MAX_TAG_LENGTH + 1);

		assert!(validate("").is_ok());
		assert!(validate(&"a".repeat(MAX_TAG_LENGTH)).is_ok());
		assert!(validate(&format!("ok, {long}")).is_err());
	}
}
