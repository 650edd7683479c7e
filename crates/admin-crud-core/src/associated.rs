//! Associated data for create/update forms
//!
//! Every belongs-to relation of the edited entity is offered either as a
//! fully enumerated select (small related tables) or as a type-ahead widget
//! (related tables above the association limit), never both.

use crate::descriptor::ModelDescriptor;
use crate::error::CrudResult;
use crate::inflector;
use crate::presenter::{Presenter, set_serialized};
use crate::record::{same_key, value_to_text};
use crate::repository::{FindOptions, RepositoryProvider, SortDirection};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Template variable holding the type-ahead descriptors
pub const TYPE_AHEAD_VARIABLE: &str = "typeAhead";

/// Option value (primary key as text) → option label
pub type OptionList = IndexMap<String, String>;

/// Type-ahead widget for a belongs-to relation with too many rows to list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAheadDescriptor {
	/// Foreign key field on the edited entity
	pub foreign_key: String,
	/// Relation alias
	pub alias: String,
	/// Registry name of the related entity
	pub class_name: String,
}

/// Select options and type-ahead widgets of one entity's belongs-to relations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedData {
	/// Option list variable name → options
	pub option_lists: IndexMap<String, OptionList>,
	/// Foreign key → type-ahead widget
	pub type_ahead: IndexMap<String, TypeAheadDescriptor>,
}

impl AssociatedData {
	pub fn option_list(&self, variable: &str) -> Option<&OptionList> {
		self.option_lists.get(variable)
	}

	pub fn is_type_ahead(&self, foreign_key: &str) -> bool {
		self.type_ahead.contains_key(foreign_key)
	}

	/// Stage option lists under their variable names and the type-ahead map
	/// under [`TYPE_AHEAD_VARIABLE`]
	pub fn apply_to(&self, presenter: &mut dyn Presenter) -> CrudResult<()> {
		for (variable, options) in &self.option_lists {
			set_serialized(presenter, variable, options)?;
		}
		set_serialized(presenter, TYPE_AHEAD_VARIABLE, &self.type_ahead)
	}
}

/// Label of a select option
///
/// `"<id> - <display>"`, or just the id when both read the same.
///
/// ```
/// use admin_crud_core::associated::option_label;
/// use serde_json::json;
///
/// assert_eq!(option_label(&json!(5), &json!("Widget")), "5 - Widget");
/// assert_eq!(option_label(&json!(5), &json!("5")), "5");
/// ```
pub fn option_label(id: &Value, display: &Value) -> String {
	if same_key(id, display) {
		value_to_text(id)
	} else {
		format!("{} - {}", value_to_text(id), value_to_text(display))
	}
}

/// Resolve option lists and type-ahead widgets for `descriptor`
///
/// A relation switches to type-ahead only when the related row count is
/// strictly greater than the entity's association limit.
pub async fn prepare_associated_data(
	descriptor: &ModelDescriptor,
	provider: &dyn RepositoryProvider,
) -> CrudResult<AssociatedData> {
	let limit = descriptor.admin().association_limit;
	let mut data = AssociatedData::default();

	for (alias, association) in descriptor.belongs_to() {
		let repository = provider.repository(&association.class_name)?;
		let count = repository.count(&[]).await?;

		if count > limit {
			tracing::debug!(
				model = %descriptor.name(),
				relation = %alias,
				count,
				limit,
				"relation rendered as type-ahead"
			);
			data.type_ahead.insert(
				association.foreign_key.clone(),
				TypeAheadDescriptor {
					foreign_key: association.foreign_key.clone(),
					alias: alias.clone(),
					class_name: association.class_name.clone(),
				},
			);
			continue;
		}

		let related = repository.descriptor();
		let rows = repository
			.find_all(&FindOptions::new().order_by(related.primary_key(), SortDirection::Asc))
			.await?;
		let options = rows
			.iter()
			.map(|row| {
				let id = row.get(related.primary_key()).unwrap_or(&Value::Null);
				let display = row.get(related.display_field()).unwrap_or(&Value::Null);
				(value_to_text(id), option_label(id, display))
			})
			.collect();
		data.option_lists.insert(
			inflector::option_list_variable(&association.foreign_key),
			options,
		);
	}

	Ok(data)
}
