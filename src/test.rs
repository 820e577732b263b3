//! Helpers shared by the HTTP tests.

use argon2::{Algorithm, Argon2, Params, Version};
pub use axum::http::{header, HeaderValue, StatusCode};
pub use axum_test::TestServer;
pub use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

/// Builds the app on top of a fresh in-memory database.
pub async fn app() -> TestServer {
	// every connection to `sqlite::memory:` opens its own database
	let database = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await
		.unwrap();

	sqlx::migrate!().run(&database).await.unwrap();

	let state = crate::State {
		database,
		hasher: Argon2::new(
			Algorithm::Argon2id,
			Version::V0x13,
			Params::new(1024, 1, 1, Some(32)).unwrap(),
		),
	};

	TestServer::new(crate::app(state, None)).unwrap()
}

pub struct TestUser {
	pub id: String,
	pub token: String,
}

pub const PASSWORD: &str = "hunter2hunter";

/// Registers `username` with the shared test password.
pub async fn register(app: &TestServer, username: &str) -> TestUser {
	let response = app
		.post("/accounts/register")
		.json(&json!({
			"username": username,
			"email": format!("{username}@example.com"),
			"password": PASSWORD,
			"password_confirm": PASSWORD,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let token = response.json::<Value>()["token"]
		.as_str()
		.unwrap()
		.to_owned();

	let profile = app
		.get("/accounts/profile")
		.add_header(header::AUTHORIZATION, bearer(&token))
		.await
		.json::<Value>();

	TestUser {
		id: profile["id"].as_str().unwrap().to_owned(),
		token,
	}
}

pub async fn login(app: &TestServer, username: &str) -> String {
	let response = app
		.post("/accounts/login")
		.json(&json!({
			"username": username,
			"password": PASSWORD,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	response.json::<Value>()["token"]
		.as_str()
		.unwrap()
		.to_owned()
}

pub fn bearer(token: &str) -> HeaderValue {
	HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

pub async fn create_post(app: &TestServer, user: &TestUser, title: &str, tags: &str) -> Value {
	let response = app
		.post("/posts")
		.add_header(header::AUTHORIZATION, bearer(&user.token))
		.json(&json!({
			"title": title,
			"content": format!("{title} content"),
			"tags": tags,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	response.json::<Value>()
}
