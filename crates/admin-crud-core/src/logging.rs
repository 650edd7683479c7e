//! Tracing subscriber setup

use crate::error::{CrudError, CrudResult};
use crate::settings::LoggingSettings;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Build the filter described by `settings`
///
/// The level applies to every target; directives refine individual targets.
pub fn build_filter(settings: &LoggingSettings) -> CrudResult<EnvFilter> {
	let mut filter = EnvFilter::try_new(&settings.level).map_err(|e| {
		CrudError::Settings(format!("invalid log level '{}': {}", settings.level, e))
	})?;
	for directive in &settings.directives {
		let parsed = directive.parse::<Directive>().map_err(|e| {
			CrudError::Settings(format!("invalid log directive '{}': {}", directive, e))
		})?;
		filter = filter.add_directive(parsed);
	}
	Ok(filter)
}

/// Install a global fmt subscriber
///
/// Returns `Ok(false)` when a global subscriber is already installed, so
/// hosts and tests may call this more than once.
pub fn init_logging(settings: &LoggingSettings) -> CrudResult<bool> {
	let filter = build_filter(settings)?;
	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init()
		.is_ok();
	if installed {
		tracing::debug!(level = %settings.level, "admin crud logging initialised");
	}
	Ok(installed)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn builds_filter_with_directives() {
		// Arrange
		let settings = LoggingSettings {
			level: "warn".into(),
			directives: vec!["admin_crud_server=debug".into()],
		};

		// Act
		let filter = build_filter(&settings).unwrap();

		// Assert
		let rendered = filter.to_string();
		assert!(rendered.contains("warn"));
		assert!(rendered.contains("admin_crud_server=debug"));
	}

	#[rstest]
	fn rejects_malformed_directive() {
		// Arrange
		let settings = LoggingSettings {
			level: "info".into(),
			directives: vec!["admin_crud_server=loud".into()],
		};

		// Act
		let result = build_filter(&settings);

		// Assert
		assert!(matches!(result, Err(CrudError::Settings(_))));
	}

	#[rstest]
	fn second_initialisation_is_a_no_op() {
		// Arrange
		let settings = LoggingSettings::default();

		// Act
		let _ = init_logging(&settings).unwrap();
		let second = init_logging(&settings).unwrap();

		// Assert
		assert!(!second);
	}
}
