#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
#[cfg(test)]
mod test;
mod token;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::Request, Extension, ServiceExt};
use sqlx::sqlite::SqlitePoolOptions;
use tower::{Layer, ServiceBuilder};
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub type Database = sqlx::SqlitePool;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the database pool and the password hasher.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
}

/// Builds the application router, with the OpenAPI document served under `/docs`.
///
/// Rate limits are only applied when `limits` is given, since they key on the
/// peer address of the connection.
pub fn app(state: State, limits: Option<ratelimit::Limits>) -> axum::Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.nest(
			"/accounts",
			route::account::routes(limits.as_ref().map(|limits| limits.credentials.clone())),
		)
		.nest("/posts", route::post::routes())
		.nest("/comments", route::comment::routes())
		.nest("/tags", route::tag::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)));

	let router = match limits {
		Some(limits) => router.layer(GovernorLayer {
			config: limits.default,
		}),
		None => router,
	};

	router.with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = config::Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let database = SqlitePoolOptions::new()
		.connect(&config.database_url)
		.await?;

	sqlx::migrate!().run(&database).await?;

	let state = State {
		database,
		hasher: Argon2::default(),
	};

	let limits = if config.rate_limit {
		let limits = ratelimit::Limits::new()
			.ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?;

		limits.cleanup_old_limits();
		Some(limits)
	} else {
		None
	};

	let app = app(state, limits).layer(
		ServiceBuilder::new()
			.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
			.layer(TraceLayer::new_for_http())
			.layer(PropagateRequestIdLayer::x_request_id())
			.layer(CompressionLayer::new())
			.layer(CorsLayer::permissive()),
	);

	// trailing slashes must be trimmed before routing, so this wraps the router
	let app = NormalizePathLayer::trim_trailing_slash().layer(app);

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.await?;

	Ok(())
}
