use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::model::{IdInput, Paginate},
	token, AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Maps a unique constraint violation on the user table to the field that caused it.
fn unique_violation(error: sqlx::Error) -> RouteError {
	if let sqlx::Error::Database(ref database) = error {
		if database.is_unique_violation() {
			if database.message().contains("user.username") {
				return Error::UsernameTaken.into();
			}

			if database.message().contains("user.email") {
				return Error::EmailTaken.into();
			}
		}
	}

	error.into()
}

async fn fetch_profile(database: &Database, user_id: Uuid) -> Result<model::Profile, sqlx::Error> {
	sqlx::query_as::<_, model::Profile>(
		r#"
			SELECT
				"user".id,
				"user".username,
				"user".email,
				COALESCE(profile.bio, '') AS bio,
				profile.profile_picture,
				(SELECT COUNT(*) FROM follow WHERE follow.followee_id = "user".id) AS followers,
				(SELECT COUNT(*) FROM follow WHERE follow.follower_id = "user".id) AS following,
				"user".created_at
			FROM "user"
			LEFT JOIN profile ON profile.user_id = "user".id
			WHERE "user".id = ?
		"#,
	)
	.bind(user_id)
	.fetch_one(database)
	.await
}

async fn fetch_user(database: &Database, user_id: Uuid) -> Result<model::User, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE id = ?"#)
		.bind(user_id)
		.fetch_optional(database)
		.await?;

	Ok(user.ok_or(Error::UnknownUser(user_id))?)
}

/// Register account
/// Registers a new account with an empty profile, returning its bearer token.
#[route(tag = tag::ACCOUNT, response(status = 201, description = "Registered successfully.", shape = "Json<model::Registered>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(input): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &input.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO "user" (id, username, email, password, created_at) VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(&input.username)
	.bind(&input.email)
	.bind(&hashed[..])
	.bind(Utc::now())
	.execute(&mut *tx)
	.await
	.map_err(unique_violation)?;

	sqlx::query("INSERT INTO profile (user_id) VALUES (?)")
		.bind(user_id)
		.execute(&mut *tx)
		.await?;

	let token = token::get_or_create(&mut tx, user_id).await?;

	tx.commit().await?;

	tracing::info!(%user_id, username = %input.username, "registered account");

	Ok((
		StatusCode::CREATED,
		Json(model::Registered {
			token,
			username: input.username,
		}),
	)
		.into_response())
}

/// Log in
/// Checks a username and password, returning the account's bearer token.
#[route(tag = tag::ACCOUNT, response(status = 200, description = "Logged in successfully.", shape = "Json<model::LoggedIn>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::LoggedIn>, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(&input.username)
		.fetch_optional(&state.database)
		.await?;

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &input.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let mut conn = state.database.acquire().await?;
	let token = token::get_or_create(&mut conn, user.id).await?;

	Ok(Json(model::LoggedIn {
		token,
		user_id: user.id,
		username: user.username,
	}))
}

/// Log out
/// Invalidates the bearer token used to authenticate this request.
#[route(tag = tag::ACCOUNT, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	let mut conn = database.acquire().await?;
	token::revoke(&mut conn, session.token).await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}

/// Get profile
/// Returns the authenticated user's account and profile.
#[route(tag = tag::ACCOUNT)]
pub async fn get_profile(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<model::Profile>, RouteError> {
	Ok(Json(fetch_profile(&database, session.user.id).await?))
}

/// Update profile
/// Updates the given fields of the authenticated user's account and profile.
#[route(tag = tag::ACCOUNT)]
pub async fn update_profile(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::UpdateProfileInput>,
) -> Result<Json<model::Profile>, RouteError> {
	let mut tx = database.begin().await?;

	sqlx::query(
		r#"
			UPDATE "user"
			SET username = COALESCE(?, username), email = COALESCE(?, email)
			WHERE id = ?
		"#,
	)
	.bind(&input.username)
	.bind(&input.email)
	.bind(session.user.id)
	.execute(&mut *tx)
	.await
	.map_err(unique_violation)?;

	sqlx::query(
		r"
			INSERT INTO profile (user_id) VALUES (?)
			ON CONFLICT (user_id) DO NOTHING
		",
	)
	.bind(session.user.id)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		r"
			UPDATE profile
			SET
				bio = COALESCE(?, bio),
				profile_picture = CASE WHEN ? IS NULL THEN profile_picture ELSE NULLIF(?, '') END
			WHERE user_id = ?
		",
	)
	.bind(&input.bio)
	.bind(&input.profile_picture)
	.bind(&input.profile_picture)
	.bind(session.user.id)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(Json(fetch_profile(&database, session.user.id).await?))
}

/// Delete account
/// Deletes the authenticated user along with their profile, posts, comments and follows. This action is irreversible.
#[route(tag = tag::ACCOUNT, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_account(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query(r#"DELETE FROM "user" WHERE id = ?"#)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	tracing::info!(user_id = %session.user.id, "deleted account");

	Ok(StatusCode::NO_CONTENT.into_response())
}

/// Follow user
/// Adds the user to the authenticated user's following. Following someone twice has no further effect.
#[route(tag = tag::ACCOUNT)]
pub async fn follow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<Json<model::Detail>, RouteError> {
	let target = fetch_user(&database, path.id).await?;

	if target.id == session.user.id {
		return Err(Error::FollowSelf.into());
	}

	sqlx::query(
		r"
			INSERT INTO follow (follower_id, followee_id, created_at) VALUES (?, ?, ?)
			ON CONFLICT (follower_id, followee_id) DO NOTHING
		",
	)
	.bind(session.user.id)
	.bind(target.id)
	.bind(Utc::now())
	.execute(&database)
	.await?;

	Ok(Json(model::Detail {
		detail: format!("You are now following {}.", target.username),
	}))
}

/// Unfollow user
/// Removes the user from the authenticated user's following. Unfollowing someone not followed has no effect.
#[route(tag = tag::ACCOUNT)]
pub async fn unfollow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<Json<model::Detail>, RouteError> {
	let target = fetch_user(&database, path.id).await?;

	if target.id == session.user.id {
		return Err(Error::UnfollowSelf.into());
	}

	sqlx::query("DELETE FROM follow WHERE follower_id = ? AND followee_id = ?")
		.bind(session.user.id)
		.bind(target.id)
		.execute(&database)
		.await?;

	Ok(Json(model::Detail {
		detail: format!("You have unfollowed {}.", target.username),
	}))
}

/// Get followers
/// Returns a paginated list of the users following a user, most recent first.
#[route(tag = tag::ACCOUNT)]
pub async fn get_followers(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<model::UserSummary>>, RouteError> {
	let user = fetch_user(&database, path.id).await?;

	let followers = sqlx::query_as::<_, model::UserSummary>(
		r#"
			SELECT "user".id, "user".username FROM follow
			JOIN "user" ON "user".id = follow.follower_id
			WHERE follow.followee_id = ?
			ORDER BY follow.created_at DESC
			LIMIT ? OFFSET ?
		"#,
	)
	.bind(user.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(followers))
}

/// Get following
/// Returns a paginated list of the users a user follows, most recent first.
#[route(tag = tag::ACCOUNT)]
pub async fn get_following(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<model::UserSummary>>, RouteError> {
	let user = fetch_user(&database, path.id).await?;

	let following = sqlx::query_as::<_, model::UserSummary>(
		r#"
			SELECT "user".id, "user".username FROM follow
			JOIN "user" ON "user".id = follow.followee_id
			WHERE follow.follower_id = ?
			ORDER BY follow.created_at DESC
			LIMIT ? OFFSET ?
		"#,
	)
	.bind(user.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(following))
}
