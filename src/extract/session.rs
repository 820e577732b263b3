use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{error::RouteError, openapi::SECURITY_SCHEME_TOKEN, route::account, token, Database};

/// Extracts the bearer token and the user it belongs to from the request.
///
/// If there is no `Authorization` header, a [`account::Error::NoAuthorizationToken`] is returned.
/// If the token is malformed or unknown, a [`account::Error::InvalidAuthorizationToken`] is returned.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub token: Uuid,
	pub user: account::model::User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<account::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or(account::Error::NoAuthorizationToken)?;

		let token = header
			.to_str()
			.ok()
			.and_then(token::parse)
			.ok_or(account::Error::InvalidAuthorizationToken)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, account::model::User>(
			r#"
				SELECT "user".* FROM "user"
				JOIN token ON token.user_id = "user".id
				WHERE token.id = ?
			"#,
		)
		.bind(token)
		.fetch_optional(&database)
		.await?;

		let user = user.ok_or(account::Error::InvalidAuthorizationToken)?;

		Ok(Session { token, user })
	}
}

impl OperationInput for Session {
	/// Adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_TOKEN.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// A [`Session`] that is only present when the request carries a token.
///
/// A request without an `Authorization` header is anonymous, but a header
/// with a bad token is still rejected.
#[derive(Debug)]
pub struct MaybeSession(pub Option<Session>);

impl MaybeSession {
	pub fn user_id(&self) -> Option<Uuid> {
		self.0.as_ref().map(|session| session.user.id)
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<account::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		if !parts.headers.contains_key(header::AUTHORIZATION) {
			return Ok(Self(None));
		}

		Session::from_request_parts(parts, state)
			.await
			.map(|session| Self(Some(session)))
	}
}

impl OperationInput for MaybeSession {}
