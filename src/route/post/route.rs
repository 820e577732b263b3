use axum::extract::State;
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, MaybeSession, Path, Query, Session},
	openapi::tag,
	route::model::{IdInput, Paginate},
	Database,
};

use super::{model, tags, Error, RouteError};

/// Fetches a single post with its tags, regardless of who may see it.
pub async fn fetch(database: &Database, post_id: Uuid) -> Result<Option<model::Post>, sqlx::Error> {
	let post = sqlx::query_as::<_, model::PostRow>(&format!(
		"{} WHERE post.id = ? {}",
		model::SELECT,
		model::GROUP_BY
	))
	.bind(post_id)
	.fetch_optional(database)
	.await?;

	Ok(post.map(model::Post::from))
}

/// Fetches a post that the given user (or an anonymous one) is allowed to see.
pub async fn fetch_visible(
	database: &Database,
	post_id: Uuid,
	user_id: Option<Uuid>,
) -> Result<Option<model::Post>, sqlx::Error> {
	Ok(fetch(database, post_id)
		.await?
		.filter(|post| post.visible_to(user_id)))
}

/// Get own posts
/// Returns a paginated response of your posts including drafts, newest first.
#[route(tag = tag::POST)]
pub async fn get_user_posts(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = sqlx::query_as::<_, model::PostRow>(&format!(
		"{} WHERE post.author_id = ? {} LIMIT ? OFFSET ?",
		model::SELECT,
		model::GROUP_BY
	))
	.bind(session.user.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts.into_iter().map(model::Post::from).collect()))
}

/// Get all posts
/// Returns a paginated response of all published posts, newest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = sqlx::query_as::<_, model::PostRow>(&format!(
		"{} WHERE post.published {} LIMIT ? OFFSET ?",
		model::SELECT,
		model::GROUP_BY
	))
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts.into_iter().map(model::Post::from).collect()))
}

/// Get single post
/// Returns a single post by its unique id. Drafts are only returned to their author.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	session: MaybeSession,
	Path(path): Path<IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = fetch_visible(&database, path.id, session.user_id()).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.id))?))
}

/// Create post
/// Creates a new post, creating any of its tags that do not exist yet.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post_id = Uuid::new_v4();
	let now = Utc::now();

	let mut tx = database.begin().await?;

	sqlx::query(
		r"
			INSERT INTO post (id, author_id, title, content, published, published_at, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
		",
	)
	.bind(post_id)
	.bind(session.user.id)
	.bind(&input.title)
	.bind(&input.content)
	.bind(input.published)
	.bind(input.published.then_some(now))
	.bind(now)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	tags::assign(&mut tx, post_id, &tags::parse(&input.tags)).await?;

	tx.commit().await?;

	tracing::debug!(%post_id, author_id = %session.user.id, "created post");

	Ok(Json(fetch(&database, post_id).await?.ok_or(Error::UnknownPost(post_id))?))
}

/// Update post
/// Updates the given fields of one of your posts. A `tags` string replaces all of its tags.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let now = Utc::now();

	let mut tx = database.begin().await?;

	let status = sqlx::query(
		r"
			UPDATE post
			SET
				title = COALESCE(?, title),
				content = COALESCE(?, content),
				published_at = CASE
					WHEN COALESCE(?, published) AND published_at IS NULL THEN ?
					ELSE published_at
				END,
				published = COALESCE(?, published),
				updated_at = ?
			WHERE id = ? AND author_id = ?
		",
	)
	.bind(&input.title)
	.bind(&input.content)
	.bind(input.published)
	.bind(now)
	.bind(input.published)
	.bind(now)
	.bind(path.id)
	.bind(session.user.id)
	.execute(&mut *tx)
	.await?;

	if status.rows_affected() == 0 {
		return Err(Error::UnknownPost(path.id).into());
	}

	if let Some(names) = &input.tags {
		tags::assign(&mut tx, path.id, &tags::parse(names)).await?;
	}

	tx.commit().await?;

	Ok(Json(fetch(&database, path.id).await?.ok_or(Error::UnknownPost(path.id))?))
}

/// Delete post
/// Deletes one of your posts along with its comments.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<(), RouteError> {
	let status = sqlx::query("DELETE FROM post WHERE id = ? AND author_id = ?")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	if status.rows_affected() == 0 {
		return Err(Error::UnknownPost(path.id).into());
	}

	Ok(())
}
