use aide::axum::{routing::put_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("unknown comment {0}")]
	UnknownComment(Uuid),
}

pub type RouteError = error::RouteError<Error>;

/// Routes addressing a comment directly. Listing and creating comments
/// live under the post they belong to.
pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/:id",
		put_with(update_comment, update_comment_docs)
			.delete_with(delete_comment, delete_comment_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownComment(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = error::Message::new(self.to_string()).field("id");

		match self {
			Self::UnknownPost(post) => message.detail("post", post.to_string()),
			Self::UnknownComment(comment) => message.detail("comment", comment.to_string()),
		}
		.into_vec()
	}
}
