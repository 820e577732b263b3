use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::middleware::StateInformationMiddleware;
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::PeerIpKeyExtractor,
	GovernorError,
};

use crate::error::AppError;

pub type Config = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// The rate limits applied per client IP address.
#[derive(Clone)]
pub struct Limits {
	/// Applied to every route.
	pub default: Config,
	/// Applied on top of `default` to registration and login.
	pub credentials: Config,
}

impl Limits {
	/// Returns `None` if a limit is configured with a zero rate or burst.
	pub fn new() -> Option<Self> {
		let default = GovernorConfigBuilder::default()
			.per_second(10)
			.burst_size(50)
			.use_headers()
			.error_handler(error_handler)
			.finish()?;

		let credentials = GovernorConfigBuilder::default()
			.per_second(1)
			.burst_size(5)
			.use_headers()
			.error_handler(error_handler)
			.finish()?;

		Some(Self {
			default: Arc::new(default),
			credentials: Arc::new(credentials),
		})
	}

	/// Periodically drops the state of clients that have not been seen recently.
	pub fn cleanup_old_limits(&self) {
		let limiters = [&self.default, &self.credentials]
			.iter()
			.map(|config| config.limiter().clone())
			.collect::<Vec<_>>();
		let interval = Duration::from_secs(60);

		std::thread::spawn(move || loop {
			std::thread::sleep(interval);

			for limiter in &limiters {
				tracing::debug!("rate limiting storage size: {}", limiter.len());

				limiter.retain_recent();
			}
		});
	}
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}
