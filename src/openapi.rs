use std::borrow::Cow;

use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};
use axum::http::header;

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_TOKEN: &str = "Token";

pub mod tag {
	pub const ACCOUNT: &str = "Account";
	pub const POST: &str = "Post";
	pub const COMMENT: &str = "Comment";
	pub const TAG: &str = "Tag";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Inkpost")
		.summary("A blog and social account API")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::ACCOUNT.into(),
			description: Some("Registration, login, profiles and follows".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Blog posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::COMMENT.into(),
			description: Some("Comments on posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::TAG.into(),
			description: Some("Post tags".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_TOKEN,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Header,
				name: header::AUTHORIZATION.as_str().into(),
				description: Some("A bearer token, sent as `Bearer <token>`".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorBody<'static>>, _>(|res| {
			res.example(error::ErrorBody {
				detail: "invalid input".into(),
				errors: error::Message::new("Comment is too short.")
					.field("content")
					.detail("min", 2)
					.into_vec(),
			})
		})
}
