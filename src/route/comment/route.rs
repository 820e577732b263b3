use axum::extract::State;
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, MaybeSession, Path, Query, Session},
	openapi::tag,
	route::{
		model::{IdInput, Paginate},
		post,
	},
	Database,
};

use super::{model, Error, RouteError};

/// Get comments
/// Returns a paginated response of a post's comments, oldest first.
#[route(tag = tag::COMMENT)]
pub async fn get_comments(
	State(database): State<Database>,
	session: MaybeSession,
	Path(path): Path<IdInput>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<model::Comment>>, RouteError> {
	post::route::fetch_visible(&database, path.id, session.user_id())
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	let comments = sqlx::query_as::<_, model::Comment>(
		r"
			SELECT * FROM comment
			WHERE post_id = ?
			ORDER BY created_at, rowid
			LIMIT ? OFFSET ?
		",
	)
	.bind(path.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(comments))
}

/// Create comment
/// Leaves a comment on a post.
#[route(tag = tag::COMMENT)]
pub async fn create_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Json<model::Comment>, RouteError> {
	post::route::fetch_visible(&database, path.id, Some(session.user.id))
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	let now = Utc::now();
	let comment = sqlx::query_as::<_, model::Comment>(
		r"
			INSERT INTO comment (id, post_id, author_id, content, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			RETURNING *
		",
	)
	.bind(Uuid::new_v4())
	.bind(path.id)
	.bind(session.user.id)
	.bind(&input.content)
	.bind(now)
	.bind(now)
	.fetch_one(&database)
	.await?;

	Ok(Json(comment))
}

/// Update comment
/// Updates one of your comments.
#[route(tag = tag::COMMENT)]
pub async fn update_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
	Json(input): Json<model::UpdateCommentInput>,
) -> Result<Json<model::Comment>, RouteError> {
	let comment = sqlx::query_as::<_, model::Comment>(
		r"
			UPDATE comment
			SET content = COALESCE(?, content), updated_at = ?
			WHERE id = ? AND author_id = ?
			RETURNING *
		",
	)
	.bind(&input.content)
	.bind(Utc::now())
	.bind(path.id)
	.bind(session.user.id)
	.fetch_optional(&database)
	.await?;

	Ok(Json(comment.ok_or(Error::UnknownComment(path.id))?))
}

/// Delete comment
/// Deletes one of your comments.
#[route(tag = tag::COMMENT)]
pub async fn delete_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<(), RouteError> {
	let status = sqlx::query("DELETE FROM comment WHERE id = ? AND author_id = ?")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	if status.rows_affected() == 0 {
		return Err(Error::UnknownComment(path.id).into());
	}

	Ok(())
}
