//! Runtime configuration, read from the environment (and a `.env` file, if present).

use std::net::IpAddr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{name} must be {expected}, got {value:?}")]
	Invalid {
		name: &'static str,
		expected: &'static str,
		value: String,
	},
}

#[derive(Debug, Clone)]
pub struct Config {
	/// The SQLite database to connect to. Migrations are applied on startup.
	pub database_url: String,
	pub host: IpAddr,
	pub port: u16,
	/// The log filter used when `RUST_LOG` is not set.
	pub log_level: String,
	/// The OTLP collector to export traces and metrics to, if any.
	pub otlp_endpoint: Option<String>,
	/// Whether to rate limit requests per client IP address.
	pub rate_limit: bool,
}

impl Config {
	/// Loads `.env` and reads the configuration from the environment.
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_vars(|name| std::env::var(name).ok())
	}

	fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |name: &str| var(name).filter(|value| !value.trim().is_empty());

		Ok(Self {
			database_url: var("DATABASE_URL")
				.unwrap_or_else(|| "sqlite://inkpost.db?mode=rwc".into()),
			host: parse(&var, "HOST", "an IP address")?.unwrap_or(IpAddr::from([127, 0, 0, 1])),
			port: parse(&var, "PORT", "a port number")?.unwrap_or(3000),
			log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
			rate_limit: parse(&var, "RATE_LIMIT", "true or false")?.unwrap_or(true),
		})
	}
}

fn parse<T: std::str::FromStr>(
	var: impl Fn(&str) -> Option<String>,
	name: &'static str,
	expected: &'static str,
) -> Result<Option<T>, Error> {
	var(name)
		.map(|value| {
			value.trim().parse().map_err(|_| Error::Invalid {
				name,
				expected,
				value,
			})
		})
		.transpose()
}
