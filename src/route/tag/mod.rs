use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown tag {0}")]
	UnknownTag(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_tags, get_tags_docs))
		.api_route("/:name/posts", get_with(get_tag_posts, get_tag_posts_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownTag(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let Self::UnknownTag(name) = self;

		error::Message::new(self.to_string())
			.field("name")
			.detail("tag", name.as_str())
			.into_vec()
	}
}
