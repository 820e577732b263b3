use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Accepted `Authorization` schemes, checked in order.
pub const AUTHORIZATION_PREFIXES: [&str; 2] = ["Bearer ", "Token "];

/// Parses the token out of an `Authorization` header value.
pub fn parse(header: &str) -> Option<Uuid> {
	AUTHORIZATION_PREFIXES
		.iter()
		.find_map(|prefix| header.strip_prefix(prefix))
		.and_then(|token| Uuid::parse_str(token.trim()).ok())
}

/// Returns the user's bearer token, creating one if they have none yet.
pub async fn get_or_create(conn: &mut SqliteConnection, user_id: Uuid) -> Result<Uuid, sqlx::Error> {
	sqlx::query(
		r"
			INSERT INTO token (id, user_id, created_at) VALUES (?, ?, ?)
			ON CONFLICT (user_id) DO NOTHING
		",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(Utc::now())
	.execute(&mut *conn)
	.await?;

	sqlx::query_scalar::<_, Uuid>("SELECT id FROM token WHERE user_id = ?")
		.bind(user_id)
		.fetch_one(&mut *conn)
		.await
}

/// Invalidates a bearer token. The next login issues a fresh one.
pub async fn revoke(conn: &mut SqliteConnection, token: Uuid) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM token WHERE id = ?")
		.bind(token)
		.execute(&mut *conn)
		.await?;

	Ok(())
}
