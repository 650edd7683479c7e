//! Storage contract
//!
//! The controller never talks to a database directly. Each entity is backed
//! by a [`Repository`]; a [`RepositoryProvider`] hands them out by entity
//! class name.

use crate::containment::Containment;
use crate::descriptor::ModelDescriptor;
use crate::error::{CrudResult, SaveError};
use crate::record::{Fields, Record, same_key, value_to_text};
use crate::sanitizer::RequestPayload;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Row filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
	/// Field equals value (compared on textual forms)
	Eq { field: String, value: Value },
	/// Field contains `needle`, case-insensitively
	Contains { field: String, needle: String },
}

impl Condition {
	pub fn eq(field: impl Into<String>, value: Value) -> Self {
		Condition::Eq {
			field: field.into(),
			value,
		}
	}

	pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
		Condition::Contains {
			field: field.into(),
			needle: needle.into(),
		}
	}

	/// Evaluate against a row; a missing field never matches
	pub fn matches(&self, fields: &Fields) -> bool {
		match self {
			Condition::Eq { field, value } => fields
				.get(field)
				.is_some_and(|actual| same_key(actual, value)),
			Condition::Contains { field, needle } => fields.get(field).is_some_and(|actual| {
				value_to_text(actual)
					.to_lowercase()
					.contains(&needle.to_lowercase())
			}),
		}
	}
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}

/// Options of a find query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
	pub conditions: Vec<Condition>,
	pub contain: Containment,
	pub order: Vec<(String, SortDirection)>,
	pub limit: Option<u64>,
	pub offset: u64,
}

impl FindOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Match a single row by primary key
	pub fn by_primary_key(descriptor: &ModelDescriptor, id: &Value) -> Self {
		Self::new().condition(Condition::eq(descriptor.primary_key(), id.clone()))
	}

	pub fn condition(mut self, condition: Condition) -> Self {
		self.conditions.push(condition);
		self
	}

	pub fn contain(mut self, contain: Containment) -> Self {
		self.contain = contain;
		self
	}

	pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
		self.order.push((field.into(), direction));
		self
	}

	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = offset;
		self
	}

	/// Limit/offset for a 1-based page number
	pub fn page(self, page: u64, page_size: u64) -> Self {
		let page = page.max(1);
		self.limit(page_size).offset((page - 1).saturating_mul(page_size))
	}
}

/// Options of `save_associated`
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
	/// Validate every row before writing
	pub validate: bool,
	/// Write all rows or none
	pub atomic: bool,
	/// Save nested relation sections too
	pub deep: bool,
	/// Primary key of the row being updated; `None` creates a new row
	pub id: Option<Value>,
}

impl Default for SaveOptions {
	fn default() -> Self {
		Self {
			validate: true,
			atomic: true,
			deep: true,
			id: None,
		}
	}
}

impl SaveOptions {
	/// Validated, atomic, deep save of a new row
	pub fn create() -> Self {
		Self::default()
	}

	/// Validated, atomic, deep save of an existing row
	pub fn update(id: Value) -> Self {
		Self {
			id: Some(id),
			..Self::default()
		}
	}
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
	/// Primary key of the primary row
	pub id: Value,
}

/// Storage for one entity
#[async_trait]
pub trait Repository: Send + Sync {
	/// Descriptor of the stored entity
	fn descriptor(&self) -> Arc<ModelDescriptor>;

	/// Blank record with every declared field set to null
	fn create(&self) -> Record {
		let descriptor = self.descriptor();
		let mut record = Record::new(descriptor.alias());
		for field in descriptor.fields() {
			record.set(field.name.clone(), Value::Null);
		}
		record
	}

	async fn find_first(&self, options: &FindOptions) -> CrudResult<Option<Record>>;

	async fn find_all(&self, options: &FindOptions) -> CrudResult<Vec<Record>>;

	async fn count(&self, conditions: &[Condition]) -> CrudResult<u64>;

	/// Save the primary section of `payload` together with its relation sections
	///
	/// With `atomic` set, nothing is written unless every row validates and
	/// writes.
	async fn save_associated(
		&self,
		payload: &RequestPayload,
		options: &SaveOptions,
	) -> Result<SaveOutcome, SaveError>;

	/// Delete a row; returns `false` when no row had that key
	async fn delete(&self, id: &Value, cascade: bool) -> CrudResult<bool>;
}

/// Hands out repositories by entity class name (`Plugin.Model` or `Model`)
pub trait RepositoryProvider: Send + Sync {
	fn repository(&self, class_name: &str) -> CrudResult<Arc<dyn Repository>>;
}
