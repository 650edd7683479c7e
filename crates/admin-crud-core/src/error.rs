//! Error types for admin CRUD operations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort an admin request
///
/// `NotFound`, `Forbidden` and `BadRequest` surface as the host framework's
/// standard error responses. Save failures are not represented here: they are
/// recovered inside the action (see [`SaveError`]).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CrudError {
	/// No record matches the requested primary key
	#[error("{model} with ID {id} not found")]
	NotFound {
		/// Entity alias
		model: String,
		/// Requested primary key, as text
		id: String,
	},

	/// Mutation attempted on a model that does not allow it
	#[error("Forbidden: {0}")]
	Forbidden(String),

	/// Malformed request (e.g. type-ahead without a search term)
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// Route model name does not resolve to a registered descriptor
	#[error("Model '{0}' is not registered with admin")]
	ModelNotRegistered(String),

	/// Descriptor failed builder validation
	#[error("Invalid model descriptor: {0}")]
	InvalidDescriptor(String),

	/// Storage collaborator failed outside of a save
	#[error("Repository error: {0}")]
	Repository(String),

	/// View data could not be staged on the presenter
	#[error("Render error: {0}")]
	Render(String),

	/// Settings could not be loaded or failed validation
	#[error("Settings error: {0}")]
	Settings(String),
}

/// Result type for admin CRUD operations
pub type CrudResult<T> = Result<T, CrudError>;

/// Validation messages keyed by entity alias, then by field name
///
/// Nested rows of a has-many section are keyed as `Alias.<index>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, IndexMap<String, Vec<String>>>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a message for `alias.field`
	pub fn add(
		&mut self,
		alias: impl Into<String>,
		field: impl Into<String>,
		message: impl Into<String>,
	) {
		self.0
			.entry(alias.into())
			.or_default()
			.entry(field.into())
			.or_default()
			.push(message.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Total number of messages across all aliases and fields
	pub fn len(&self) -> usize {
		self.0
			.values()
			.flat_map(|fields| fields.values())
			.map(Vec::len)
			.sum()
	}

	/// Messages recorded for one field
	pub fn field(&self, alias: &str, field: &str) -> Option<&[String]> {
		self.0
			.get(alias)
			.and_then(|fields| fields.get(field))
			.map(Vec::as_slice)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexMap<String, Vec<String>>)> {
		self.0.iter()
	}
}

/// Recoverable failure of `save_associated`
///
/// Nothing has been written when this is returned: the save is atomic.
#[derive(Debug, Error)]
pub enum SaveError {
	/// One or more rows failed validation
	#[error("Validation failed with {} error(s)", .0.len())]
	Validation(ValidationErrors),

	/// The write itself failed and was rolled back
	#[error("Storage failure: {0}")]
	Storage(String),
}

impl SaveError {
	/// Validation messages, if this failure carries any
	pub fn validation_errors(&self) -> Option<&ValidationErrors> {
		match self {
			SaveError::Validation(errors) => Some(errors),
			SaveError::Storage(_) => None,
		}
	}
}
