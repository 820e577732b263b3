use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	route::{
		model::{NameInput, Paginate},
		post,
	},
	Database,
};

use super::{model, Error, RouteError};

/// Get tags
/// Returns every tag ordered by name, with the number of published posts carrying it.
#[route(tag = tag::TAG)]
pub async fn get_tags(State(database): State<Database>) -> Result<Json<Vec<model::Tag>>, RouteError> {
	let tags = sqlx::query_as::<_, model::Tag>(
		r"
			SELECT tag.id, tag.name, COUNT(post.id) AS posts
			FROM tag
			LEFT JOIN post_tag ON post_tag.tag_id = tag.id
			LEFT JOIN post ON post.id = post_tag.post_id AND post.published
			GROUP BY tag.id
			ORDER BY tag.name
		",
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(tags))
}

/// Get tagged posts
/// Returns a paginated response of the published posts with a tag, newest first.
#[route(tag = tag::TAG)]
pub async fn get_tag_posts(
	State(database): State<Database>,
	Path(path): Path<NameInput>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<Vec<post::model::Post>>, RouteError> {
	let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tag WHERE name = ?")
		.bind(&path.name)
		.fetch_one(&database)
		.await?;

	if exists == 0 {
		return Err(Error::UnknownTag(path.name).into());
	}

	let posts = sqlx::query_as::<_, post::model::PostRow>(&format!(
		r"
			{}
			WHERE post.published AND post.id IN (
				SELECT post_tag.post_id FROM post_tag
				JOIN tag ON tag.id = post_tag.tag_id
				WHERE tag.name = ?
			)
			{}
			LIMIT ? OFFSET ?
		",
		post::model::SELECT,
		post::model::GROUP_BY
	))
	.bind(&path.name)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts.into_iter().map(post::model::Post::from).collect()))
}
