//! Admin CRUD settings
//!
//! Settings are read from TOML and then overridden by `ADMIN_CRUD_*`
//! environment variables (environment > file > defaults).

use crate::error::{CrudError, CrudResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of rows per list page
pub const DEFAULT_PAGINATE_LIMIT: u64 = 25;

/// Default number of related rows above which a select becomes a type-ahead
pub const DEFAULT_ASSOCIATION_LIMIT: u64 = 75;

/// Upper bound for any page size, whatever a descriptor asks for
pub const MAX_PAGE_SIZE: u64 = 500;

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "ADMIN_CRUD_";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// Default level (`trace`, `debug`, `info`, `warn`, `error`)
	pub level: String,
	/// Extra `tracing_subscriber::EnvFilter` directives, e.g. `admin_crud_server=debug`
	pub directives: Vec<String>,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".into(),
			directives: Vec::new(),
		}
	}
}

/// Global settings for the admin CRUD controller
///
/// # Examples
///
/// ```
/// use admin_crud_core::settings::CrudSettings;
///
/// let settings = CrudSettings::from_toml_str(r#"
///     url_prefix = "/backoffice"
///     association_limit = 10
/// "#).unwrap();
///
/// assert_eq!(settings.url_prefix, "/backoffice");
/// assert_eq!(settings.association_limit, 10);
/// assert_eq!(settings.paginate_limit, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudSettings {
	/// Path under which admin routes are mounted
	pub url_prefix: String,
	/// Default rows per page for descriptors without their own setting
	pub paginate_limit: u64,
	/// Default type-ahead threshold for descriptors without their own setting
	pub association_limit: u64,
	/// Default deletability for descriptors without their own setting
	pub deletable: bool,
	/// Hard cap applied to every page size
	pub max_page_size: u64,
	pub logging: LoggingSettings,
}

impl Default for CrudSettings {
	fn default() -> Self {
		Self {
			url_prefix: "/admin".into(),
			paginate_limit: DEFAULT_PAGINATE_LIMIT,
			association_limit: DEFAULT_ASSOCIATION_LIMIT,
			deletable: true,
			max_page_size: MAX_PAGE_SIZE,
			logging: LoggingSettings::default(),
		}
	}
}

impl CrudSettings {
	/// Parse settings from a TOML document and validate them
	///
	/// The process environment is not consulted; use [`CrudSettings::from_file`]
	/// or call [`CrudSettings::apply_env_overrides`] afterwards to layer
	/// `ADMIN_CRUD_*` variables on top.
	pub fn from_toml_str(source: &str) -> CrudResult<Self> {
		let settings: Self =
			toml::from_str(source).map_err(|e| CrudError::Settings(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read a TOML file, apply environment overrides and validate
	pub fn from_file(path: impl AsRef<Path>) -> CrudResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path)
			.map_err(|e| CrudError::Settings(format!("{}: {}", path.display(), e)))?;
		let mut settings: Self =
			toml::from_str(&source).map_err(|e| CrudError::Settings(e.to_string()))?;
		settings.apply_env_overrides_from(std::env::vars())?;
		settings.validate()?;
		Ok(settings)
	}

	/// Apply overrides from the process environment
	pub fn apply_env_overrides(&mut self) -> CrudResult<()> {
		self.apply_env_overrides_from(std::env::vars())
	}

	/// Apply overrides from `ADMIN_CRUD_*` pairs; other keys are ignored
	pub fn apply_env_overrides_from<I, K, V>(&mut self, vars: I) -> CrudResult<()>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		for (key, value) in vars {
			let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
				continue;
			};
			let value = value.as_ref().trim();
			match name {
				"URL_PREFIX" => self.url_prefix = value.to_string(),
				"PAGINATE_LIMIT" => self.paginate_limit = parse_number(name, value)?,
				"ASSOCIATION_LIMIT" => self.association_limit = parse_number(name, value)?,
				"MAX_PAGE_SIZE" => self.max_page_size = parse_number(name, value)?,
				"DELETABLE" => self.deletable = parse_bool(name, value)?,
				"LOG_LEVEL" => self.logging.level = value.to_lowercase(),
				_ => {}
			}
		}
		Ok(())
	}

	/// Reject settings the controller cannot work with
	pub fn validate(&self) -> CrudResult<()> {
		if !self.url_prefix.starts_with('/') {
			return Err(CrudError::Settings(format!(
				"url_prefix must start with '/': {}",
				self.url_prefix
			)));
		}
		if self.paginate_limit == 0 || self.max_page_size == 0 {
			return Err(CrudError::Settings(
				"paginate_limit and max_page_size must be greater than zero".into(),
			));
		}
		Ok(())
	}

	/// Effective page size for a descriptor's paginate limit
	///
	/// Always at least one row, also for settings that never went through
	/// [`CrudSettings::validate`].
	pub fn page_size(&self, paginate_limit: u64) -> u64 {
		paginate_limit.max(1).min(self.max_page_size.max(1))
	}
}

fn parse_number(name: &str, value: &str) -> CrudResult<u64> {
	value.parse().map_err(|_| {
		CrudError::Settings(format!("{}{} is not a number: {}", ENV_PREFIX, name, value))
	})
}

fn parse_bool(name: &str, value: &str) -> CrudResult<bool> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(CrudError::Settings(format!(
			"{}{} is not a boolean: {}",
			ENV_PREFIX, name, value
		))),
	}
}
