//! Request payload sanitizing
//!
//! Form submissions carry control fields next to the real ones: a
//! `<field>_null` checkbox asking for `<field>` to be stored as null, a
//! `<field>_type_ahead` text box backing a type-ahead widget, and
//! `redirect_to` naming the action to return to. None of them is persisted.

use crate::record::{Fields, is_truthy, value_to_text};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suffix of "store as null" control fields
pub const NULL_SUFFIX: &str = "_null";

/// Suffix of type-ahead search boxes
pub const TYPE_AHEAD_SUFFIX: &str = "_type_ahead";

/// Field naming the action to redirect to after a successful mutation
pub const REDIRECT_FIELD: &str = "redirect_to";

/// Submitted data of one entity alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadSection {
	/// Rows of a has-many relation
	Rows(Vec<Fields>),
	/// Fields of the primary entity or of a to-one relation
	Fields(Fields),
}

impl PayloadSection {
	/// Every field map of the section
	pub fn field_maps(&self) -> Vec<&Fields> {
		match self {
			PayloadSection::Fields(fields) => vec![fields],
			PayloadSection::Rows(rows) => rows.iter().collect(),
		}
	}

	fn field_maps_mut(&mut self) -> Vec<&mut Fields> {
		match self {
			PayloadSection::Fields(fields) => vec![fields],
			PayloadSection::Rows(rows) => rows.iter_mut().collect(),
		}
	}
}

/// Submitted request body: entity alias → section
///
/// ```
/// use admin_crud_core::sanitizer::RequestPayload;
/// use serde_json::json;
///
/// let payload: RequestPayload = serde_json::from_value(json!({
///     "Post": {"title": "Hello", "redirect_to": "read"},
///     "Comment": [{"body": "First"}],
/// }))
/// .unwrap();
///
/// assert_eq!(payload.field("Post", "title"), Some(&json!("Hello")));
/// assert!(payload.rows("Comment").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestPayload(IndexMap<String, PayloadSection>);

impl RequestPayload {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, alias: impl Into<String>, section: PayloadSection) {
		self.0.insert(alias.into(), section);
	}

	/// Builder-style [`insert`](Self::insert) of a field map
	pub fn with_fields(mut self, alias: impl Into<String>, fields: Fields) -> Self {
		self.insert(alias, PayloadSection::Fields(fields));
		self
	}

	/// Builder-style [`insert`](Self::insert) of has-many rows
	pub fn with_rows(mut self, alias: impl Into<String>, rows: Vec<Fields>) -> Self {
		self.insert(alias, PayloadSection::Rows(rows));
		self
	}

	pub fn section(&self, alias: &str) -> Option<&PayloadSection> {
		self.0.get(alias)
	}

	/// Field map of `alias`, when it was submitted as one
	pub fn fields(&self, alias: &str) -> Option<&Fields> {
		match self.0.get(alias) {
			Some(PayloadSection::Fields(fields)) => Some(fields),
			_ => None,
		}
	}

	pub fn fields_mut(&mut self, alias: &str) -> Option<&mut Fields> {
		match self.0.get_mut(alias) {
			Some(PayloadSection::Fields(fields)) => Some(fields),
			_ => None,
		}
	}

	/// Rows of `alias`, when it was submitted as a list
	pub fn rows(&self, alias: &str) -> Option<&[Fields]> {
		match self.0.get(alias) {
			Some(PayloadSection::Rows(rows)) => Some(rows),
			_ => None,
		}
	}

	pub fn field(&self, alias: &str, field: &str) -> Option<&Value> {
		self.fields(alias).and_then(|fields| fields.get(field))
	}

	pub fn aliases(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &PayloadSection)> {
		self.0.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn field_maps_mut(&mut self) -> impl Iterator<Item = &mut Fields> {
		self.0
			.values_mut()
			.flat_map(PayloadSection::field_maps_mut)
	}
}

/// Whether `name` is a control field that must never reach storage
pub fn is_control_field(name: &str) -> bool {
	name.ends_with(NULL_SUFFIX) || name.ends_with(TYPE_AHEAD_SUFFIX) || name == REDIRECT_FIELD
}

/// Null out every field whose `<field>_null` companion is truthy
///
/// Runs before [`strip_control_fields`] and before validation. The
/// companion fields themselves are left in place.
pub fn coerce_nulls(payload: &mut RequestPayload) {
	for fields in payload.field_maps_mut() {
		let targets: Vec<String> = fields
			.iter()
			.filter(|(_, value)| is_truthy(value))
			.filter_map(|(name, _)| name.strip_suffix(NULL_SUFFIX))
			.filter(|base| !base.is_empty())
			.map(str::to_string)
			.collect();
		for base in targets {
			tracing::trace!(field = %base, "coercing field to null");
			fields.insert(base, Value::Null);
		}
	}
}

/// Remove control fields from every field map
///
/// Idempotent.
pub fn strip_control_fields(payload: &mut RequestPayload) {
	for fields in payload.field_maps_mut() {
		fields.retain(|name, _| !is_control_field(name));
	}
}

/// Copy of `payload` ready to hand to a repository
///
/// Expects [`coerce_nulls`] to have run on `payload` already.
pub fn stripped(payload: &RequestPayload) -> RequestPayload {
	let mut clean = payload.clone();
	strip_control_fields(&mut clean);
	clean
}

/// `redirect_to` value of the `alias` section, if set and non-empty
pub fn redirect_target(payload: &RequestPayload, alias: &str) -> Option<String> {
	payload
		.field(alias, REDIRECT_FIELD)
		.map(value_to_text)
		.map(|target| target.trim().to_string())
		.filter(|target| !target.is_empty())
}
