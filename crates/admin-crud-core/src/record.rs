//! Records and field values

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Field name → value map of a single row
pub type Fields = IndexMap<String, Value>;

/// Related data nested under a record
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
	/// belongs-to / has-one: at most one row
	One(Option<Box<Record>>),
	/// has-many / has-and-belongs-to-many
	Many(Vec<Record>),
}

impl Serialize for Related {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Related::One(record) => record.serialize(serializer),
			Related::Many(records) => records.serialize(serializer),
		}
	}
}

/// A row of an entity plus whatever related rows were contained with it
///
/// Serializes the way templates expect it: the row's own fields followed by
/// one key per contained relation alias.
///
/// ```
/// use admin_crud_core::record::{Record, Related};
/// use serde_json::json;
///
/// let mut post = Record::new("Post")
///     .with_field("id", json!(1))
///     .with_field("title", json!("Hello"));
/// post.set_related("Author", Related::One(None));
///
/// assert_eq!(
///     serde_json::to_value(&post).unwrap(),
///     json!({"id": 1, "title": "Hello", "Author": null})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	alias: String,
	fields: Fields,
	related: IndexMap<String, Related>,
}

impl Record {
	pub fn new(alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			fields: Fields::new(),
			related: IndexMap::new(),
		}
	}

	pub fn from_fields(alias: impl Into<String>, fields: Fields) -> Self {
		Self {
			alias: alias.into(),
			fields,
			related: IndexMap::new(),
		}
	}

	pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
		self.fields.insert(name.into(), value);
		self
	}

	/// Alias of the entity this row belongs to
	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn fields(&self) -> &Fields {
		&self.fields
	}

	pub fn fields_mut(&mut self) -> &mut Fields {
		&mut self.fields
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.fields.get(field)
	}

	pub fn set(&mut self, field: impl Into<String>, value: Value) {
		self.fields.insert(field.into(), value);
	}

	pub fn related(&self, alias: &str) -> Option<&Related> {
		self.related.get(alias)
	}

	pub fn related_aliases(&self) -> impl Iterator<Item = &str> {
		self.related.keys().map(String::as_str)
	}

	pub fn set_related(&mut self, alias: impl Into<String>, related: Related) {
		self.related.insert(alias.into(), related);
	}

	/// Single related row, if the relation was contained and present
	pub fn related_one(&self, alias: &str) -> Option<&Record> {
		match self.related.get(alias) {
			Some(Related::One(Some(record))) => Some(record),
			_ => None,
		}
	}

	/// Related rows of a to-many relation (empty when not contained)
	pub fn related_many(&self, alias: &str) -> &[Record] {
		match self.related.get(alias) {
			Some(Related::Many(records)) => records,
			_ => &[],
		}
	}

	/// Owned field map, dropping related data
	pub fn into_fields(self) -> Fields {
		self.fields
	}
}

impl Serialize for Record {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		use serde::ser::SerializeMap;

		let mut map = serializer.serialize_map(Some(self.fields.len() + self.related.len()))?;
		for (name, value) in &self.fields {
			map.serialize_entry(name, value)?;
		}
		for (alias, related) in &self.related {
			map.serialize_entry(alias, related)?;
		}
		map.end()
	}
}

/// Textual form of a value as it appears in labels and URLs
///
/// Strings are used verbatim, null becomes the empty string and everything
/// else uses its JSON rendering.
pub fn value_to_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Whether a submitted control value counts as "set"
///
/// `null`, `false`, `0`, `""`, `"0"` and empty collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty() && s != "0",
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}

/// Two values identify the same row when their textual forms match
pub fn same_key(left: &Value, right: &Value) -> bool {
	value_to_text(left) == value_to_text(right)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(null), false)]
	#[case(json!(false), false)]
	#[case(json!(true), true)]
	#[case(json!(0), false)]
	#[case(json!(0.0), false)]
	#[case(json!(2), true)]
	#[case(json!(""), false)]
	#[case(json!("0"), false)]
	#[case(json!("1"), true)]
	#[case(json!("on"), true)]
	#[case(json!([]), false)]
	#[case(json!([0]), true)]
	#[case(json!({}), false)]
	fn truthiness(#[case] value: Value, #[case] expected: bool) {
		assert_eq!(is_truthy(&value), expected);
	}

	#[rstest]
	#[case(json!(5), "5")]
	#[case(json!("Widget"), "Widget")]
	#[case(json!(null), "")]
	#[case(json!(1.5), "1.5")]
	#[case(json!(true), "true")]
	fn renders_values_as_text(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(value_to_text(&value), expected);
	}

	#[rstest]
	fn numeric_and_string_keys_compare_equal() {
		assert!(same_key(&json!(5), &json!("5")));
		assert!(!same_key(&json!(5), &json!(6)));
	}

	#[rstest]
	fn serializes_nested_related_rows() {
		// Arrange
		let author = Record::new("User").with_field("id", json!(7));
		let comment = Record::new("Comment").with_field("id", json!(1));
		let mut post = Record::new("Post").with_field("id", json!(3));
		post.set_related("Author", Related::One(Some(Box::new(author))));
		post.set_related("Comment", Related::Many(vec![comment]));

		// Act
		let value = serde_json::to_value(&post).unwrap();

		// Assert
		assert_eq!(
			value,
			json!({"id": 3, "Author": {"id": 7}, "Comment": [{"id": 1}]})
		);
		assert_eq!(post.related_one("Author").map(Record::alias), Some("User"));
		assert_eq!(post.related_many("Comment").len(), 1);
		assert!(post.related_many("Tag").is_empty());
	}
}
