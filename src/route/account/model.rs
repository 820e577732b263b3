use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Characters allowed in a username besides letters and digits.
const USERNAME_SYMBOLS: &str = "@.+-_";

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !c.is_alphanumeric() && !USERNAME_SYMBOLS.contains(c))
	{
		let mut error = ValidationError::new("invalid_username");
		error.message = Some(Cow::Borrowed(
			"Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
		));

		return Err(error);
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The username that is displayed to the public.
	pub username: String,
	/// The user's email address. Only shown on their own profile.
	#[serde(skip_serializing)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user as shown in follower and following lists.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct UserSummary {
	pub id: Uuid,
	pub username: String,
}

/// The authenticated user's account and profile.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Profile {
	pub id: Uuid,
	pub username: String,
	pub email: String,
	/// A free-form biography.
	pub bio: String,
	/// A reference to the profile picture, if one is set.
	pub profile_picture: Option<String>,
	/// The number of users following this user.
	pub followers: i64,
	/// The number of users this user follows.
	pub following: i64,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
	pub username: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// Must be identical to `password`.
	#[validate(must_match(other = "password", message = "The two password fields didn't match."))]
	pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 150))]
	pub username: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

/// A partial update of the authenticated user's account and profile.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateProfileInput {
	#[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
	pub username: Option<String>,
	#[validate(email)]
	pub email: Option<String>,
	pub bio: Option<String>,
	/// A reference to the profile picture. An empty string removes it.
	#[validate(length(max = 255))]
	pub profile_picture: Option<String>,
}

/// Returned after registering.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Registered {
	/// The bearer token to send in the `Authorization` header.
	pub token: Uuid,
	pub username: String,
}

/// Returned after logging in.
#[derive(Debug, Serialize, JsonSchema)]
pub struct LoggedIn {
	/// The bearer token to send in the `Authorization` header.
	pub token: Uuid,
	pub user_id: Uuid,
	pub username: String,
}

/// A confirmation message.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Detail {
	pub detail: String,
}
