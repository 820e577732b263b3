use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message.
///
/// The content is presented to the client, so it should not contain
/// sensitive information.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A human-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional machine-readable details.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	/// A summary of what went wrong.
	pub detail: Cow<'a, str>,
	/// The individual errors, at least one unless the error is internal.
	pub errors: Vec<Message<'a>>,
}

fn respond(status: StatusCode, detail: Cow<'_, str>, errors: Vec<Message<'_>>) -> Response<Body> {
	(status, axum::Json(ErrorBody { detail, errors })).into_response()
}

/// The shape of an error specific to a group of routes.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>> {
		Message::new(self.to_string()).into_vec()
	}
}

/// Errors shared by every route: input rejections, validation and storage.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("rate limit error: {0}")]
	RateLimit(#[from] GovernorError),
}

impl AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Json(rejection) => rejection.status(),
			Self::Query(rejection) => rejection.status(),
			Self::Path(rejection) => rejection.status(),
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::RateLimit(error) => match error {
				GovernorError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
				GovernorError::UnableToExtractKey => StatusCode::INTERNAL_SERVER_ERROR,
				GovernorError::Other { code, .. } => *code,
			},
		}
	}

	fn detail(&self) -> Cow<'static, str> {
		match self {
			Self::Validation(..) => "invalid input".into(),
			Self::Json(rejection) => rejection.body_text().into(),
			Self::Query(rejection) => rejection.body_text().into(),
			Self::Path(rejection) => rejection.body_text().into(),
			Self::Database(..) => "internal server error".into(),
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, .. }) => {
				format!("too many requests, retry in {wait_time}s").into()
			}
			Self::RateLimit(..) => "internal server error".into(),
		}
	}

	fn errors(&self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => validation_messages(errors),
			Self::Database(..) | Self::RateLimit(GovernorError::UnableToExtractKey) => Vec::new(),
			_ => Message::new(self.detail()).into_vec(),
		}
	}
}

/// Flattens field errors into one message per failing rule, ordered by field.
fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
	fields.sort_by(|a, b| a.0.cmp(&b.0));

	fields
		.into_iter()
		.flat_map(|(field, errors)| {
			errors.iter().map(move |error| {
				let content = error
					.message
					.clone()
					.unwrap_or_else(|| Cow::Owned(error.code.to_string()));
				let mut message = Message::new(content).field(field);

				for (key, value) in &error.params {
					if *key != "value" {
						message = message.detail(key.to_string(), value.clone());
					}
				}

				message
			})
		})
		.collect()
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		let mut response = respond(status, self.detail(), self.errors());

		if let Self::RateLimit(
			GovernorError::TooManyRequests {
				headers: Some(headers),
				..
			}
			| GovernorError::Other {
				headers: Some(headers),
				..
			},
		) = self
		{
			response.headers_mut().extend(headers);
		}

		response
	}
}

impl aide::OperationOutput for AppError {
	type Inner = Self;
}

/// The error returned by route handlers: either an error specific to the
/// routes (`T`) or one shared by the whole application.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<T: ErrorShape> {
	#[error(transparent)]
	Route(T),
	#[error(transparent)]
	App(#[from] AppError),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T: ErrorShape> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Route(error) => {
				let status = error.status();

				if status.is_server_error() {
					tracing::error!(error = %error, "request failed");

					return respond(status, "internal server error".into(), Vec::new());
				}

				respond(status, error.to_string().into(), error.errors())
			}
			Self::App(error) => error.into_response(),
		}
	}
}

impl<T: ErrorShape> aide::OperationOutput for RouteError<T> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 2, message = "too short"))]
		name: String,
		#[validate(range(min = 1))]
		count: i64,
	}

	#[test]
	fn test_validation_messages_name_fields() {
		let errors = Input {
			name: "a".into(),
			count: 0,
		}
		.validate()
		.unwrap_err();

		let messages = validation_messages(&errors);

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0].field.as_deref(), Some("count"));
		assert_eq!(messages[0].content, "range");
		assert_eq!(messages[1].field.as_deref(), Some("name"));
		assert_eq!(messages[1].content, "too short");
		assert_eq!(
			messages[1].details.as_ref().unwrap().get("min"),
			Some(&serde_json::json!(2))
		);
	}

	#[test]
	fn test_message_builder() {
		let message = Message::new("unknown post").field("id").detail("id", "abc");

		assert_eq!(message.field.as_deref(), Some("id"));
		assert_eq!(message.details.unwrap()["id"], "abc");
	}
}
