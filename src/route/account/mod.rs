use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use tower_governor::GovernorLayer;
use uuid::Uuid;

use crate::{error, ratelimit, AppState};

pub mod model;
pub mod route;

/// An error that can occur while authenticating or managing accounts.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("no authorization token")]
	NoAuthorizationToken,
	#[error("invalid authorization token")]
	InvalidAuthorizationToken,
	#[error("A user with that username already exists.")]
	UsernameTaken,
	#[error("A user with that email already exists.")]
	EmailTaken,
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
	#[error("You cannot follow yourself.")]
	FollowSelf,
	#[error("You cannot unfollow yourself.")]
	UnfollowSelf,
}

pub type RouteError = error::RouteError<Error>;

/// Account routes. Registration and login get their own, stricter rate limit
/// when one is given.
pub fn routes(credential_limit: Option<ratelimit::Config>) -> ApiRouter<AppState> {
	use route::*;

	let mut credentials = ApiRouter::new()
		.api_route("/register", post_with(register, register_docs))
		.api_route("/login", post_with(login, login_docs));

	if let Some(config) = credential_limit {
		credentials = credentials.layer(GovernorLayer { config });
	}

	ApiRouter::new()
		.merge(credentials)
		.api_route("/logout", post_with(logout, logout_docs))
		.api_route(
			"/profile",
			get_with(get_profile, get_profile_docs)
				.put_with(update_profile, update_profile_docs)
				.delete_with(delete_account, delete_account_docs),
		)
		.api_route("/follow/:id", post_with(follow, follow_docs))
		.api_route("/unfollow/:id", post_with(unfollow, unfollow_docs))
		.api_route("/:id/followers", get_with(get_followers, get_followers_docs))
		.api_route("/:id/following", get_with(get_following, get_following_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NoAuthorizationToken | Self::InvalidAuthorizationToken => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::InvalidUsernameOrPassword
			| Self::UsernameTaken
			| Self::EmailTaken
			| Self::FollowSelf
			| Self::UnfollowSelf => StatusCode::BAD_REQUEST,
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UsernameTaken => message.field("username"),
			Self::EmailTaken => message.field("email"),
			Self::UnknownUser(user) => message.detail("user", user.to_string()),
			_ => message,
		}
		.into_vec()
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_register_login_flow() {
		let app = app().await;

		let response = app
			.post("/accounts/register")
			.json(&json!({
				"username": "john",
				"email": "john@smith.com",
				"password": "hunter2hunter",
				"password_confirm": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);

		let body = response.json::<Value>();
		let token = body["token"].as_str().unwrap().to_owned();

		assert_eq!(body["username"], "john");

		let response = app
			.post("/accounts/login")
			.json(&json!({
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		assert_eq!(body["token"], token.as_str());
		assert_eq!(body["username"], "john");

		let response = app
			.get("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		assert_eq!(body["username"], "john");
		assert_eq!(body["email"], "john@smith.com");
		assert_eq!(body["bio"], "");
		assert_eq!(body["followers"], 0);
	}

	#[tokio::test]
	async fn test_register_password_mismatch_creates_nothing() {
		let app = app().await;

		let response = app
			.post("/accounts/register")
			.json(&json!({
				"username": "john",
				"email": "john@smith.com",
				"password": "hunter2hunter",
				"password_confirm": "hunter3hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.json::<Value>()["errors"][0]["field"],
			"password_confirm"
		);

		let response = app
			.post("/accounts/login")
			.json(&json!({
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.json::<Value>()["detail"],
			"invalid username or password"
		);
	}

	#[tokio::test]
	async fn test_register_duplicate_username() {
		let app = app().await;

		register(&app, "john").await;

		let response = app
			.post("/accounts/register")
			.json(&json!({
				"username": "john",
				"email": "other@smith.com",
				"password": "hunter2hunter",
				"password_confirm": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "username");
	}

	#[tokio::test]
	async fn test_login_wrong_password() {
		let app = app().await;

		register(&app, "john").await;

		let response = app
			.post("/accounts/login")
			.json(&json!({
				"username": "john",
				"password": "wrong-password",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_profile_requires_token() {
		let app = app().await;

		let response = app.get("/accounts/profile").await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(response.json::<Value>()["detail"], "no authorization token");

		let response = app
			.get("/accounts/profile")
			.add_header(
				header::AUTHORIZATION,
				HeaderValue::from_static("Bearer 00000000-0000-0000-0000-000000000000"),
			)
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json::<Value>()["detail"],
			"invalid authorization token"
		);
	}

	#[tokio::test]
	async fn test_update_profile_partially() {
		let app = app().await;
		let user = register(&app, "john").await;

		let response = app
			.put("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.json(&json!({
				"bio": "Writes about Rust.",
				"profile_picture": "profile_pics/john.png",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		assert_eq!(body["username"], "john");
		assert_eq!(body["bio"], "Writes about Rust.");
		assert_eq!(body["profile_picture"], "profile_pics/john.png");

		let response = app
			.put("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.json(&json!({ "username": "johnny", "profile_picture": "" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		assert_eq!(body["username"], "johnny");
		assert_eq!(body["bio"], "Writes about Rust.");
		assert_eq!(body["profile_picture"], Value::Null);

		let response = app
			.put("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.json(&json!({ "email": "not-an-email" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_logout_revokes_token() {
		let app = app().await;
		let user = register(&app, "john").await;

		let response = app
			.post("/accounts/logout")
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = app
			.get("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let token = login(&app, "john").await;

		assert_ne!(token, user.token);
	}

	#[tokio::test]
	async fn test_follow_self_is_rejected() {
		let app = app().await;
		let user = register(&app, "john").await;

		let response = app
			.post(&format!("/accounts/follow/{}", user.id))
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.json::<Value>()["detail"],
			"You cannot follow yourself."
		);

		let response = app
			.post(&format!("/accounts/unfollow/{}", user.id))
			.add_header(header::AUTHORIZATION, bearer(&user.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.json::<Value>()["detail"],
			"You cannot unfollow yourself."
		);

		let response = app
			.get(&format!("/accounts/{}/following", user.id))
			.await;

		assert_eq!(response.json::<Value>(), json!([]));
	}

	#[tokio::test]
	async fn test_follow_is_idempotent() {
		let app = app().await;
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		for _ in 0..2 {
			let response = app
				.post(&format!("/accounts/follow/{}", jane.id))
				.add_header(header::AUTHORIZATION, bearer(&john.token))
				.await;

			assert_eq!(response.status_code(), StatusCode::OK);
			assert_eq!(
				response.json::<Value>()["detail"],
				"You are now following jane."
			);
		}

		let response = app.get(&format!("/accounts/{}/followers", jane.id)).await;
		let followers = response.json::<Value>();

		assert_eq!(followers.as_array().unwrap().len(), 1);
		assert_eq!(followers[0]["username"], "john");

		let response = app
			.get("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.json::<Value>()["following"], 1);
	}

	#[tokio::test]
	async fn test_unfollow_is_idempotent() {
		let app = app().await;
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		let response = app
			.post(&format!("/accounts/unfollow/{}", jane.id))
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(
			response.json::<Value>()["detail"],
			"You have unfollowed jane."
		);

		app.post(&format!("/accounts/follow/{}", jane.id))
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		let response = app
			.post(&format!("/accounts/unfollow/{}", jane.id))
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = app.get(&format!("/accounts/{}/following", john.id)).await;

		assert_eq!(response.json::<Value>(), json!([]));
	}

	#[tokio::test]
	async fn test_follow_unknown_user() {
		let app = app().await;
		let john = register(&app, "john").await;

		let response = app
			.post(&format!("/accounts/follow/{}", uuid::Uuid::new_v4()))
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_delete_account_cascades() {
		let app = app().await;
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		app.post(&format!("/accounts/follow/{}", jane.id))
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Hello", "content": "World", "tags": "intro" }))
			.await;

		let post_id = response.json::<Value>()["id"].as_str().unwrap().to_owned();

		let response = app
			.delete("/accounts/profile")
			.add_header(header::AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = app.get(&format!("/posts/{post_id}")).await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

		let response = app.get(&format!("/accounts/{}/followers", jane.id)).await;

		assert_eq!(response.json::<Value>(), json!([]));
	}
}
