//! Model descriptors
//!
//! A [`ModelDescriptor`] is the static description of one entity type: its
//! identity, its relations to other entities and its admin settings. The
//! controller never mutates a descriptor; it is built once, registered in a
//! [`ModelRegistry`](crate::registry::ModelRegistry) and shared behind an `Arc`.

use crate::error::{CrudError, CrudResult};
use crate::inflector;
use crate::settings::{CrudSettings, DEFAULT_ASSOCIATION_LIMIT, DEFAULT_PAGINATE_LIMIT};
use indexmap::IndexMap;
use serde::Serialize;

/// Cardinality/direction of a relation between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
	/// This entity holds the foreign key of a parent
	BelongsTo,
	/// One child row holds this entity's key
	HasOne,
	/// Many child rows hold this entity's key
	HasMany,
	/// Rows are linked through a join table
	HasAndBelongsToMany,
}

impl RelationKind {
	pub const ALL: [RelationKind; 4] = [
		RelationKind::BelongsTo,
		RelationKind::HasOne,
		RelationKind::HasMany,
		RelationKind::HasAndBelongsToMany,
	];
}

/// One side of a relation as seen from the owning descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
	/// Registry name of the related entity (`Plugin.Model` or `Model`)
	pub class_name: String,
	/// Foreign key column
	///
	/// For belongs-to it lives on this entity; for has-one/has-many it lives
	/// on the related entity; for has-and-belongs-to-many it is the join
	/// table column pointing back at this entity.
	pub foreign_key: String,
	/// Join table (has-and-belongs-to-many only)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub join_table: Option<String>,
	/// Join table column pointing at the related entity (has-and-belongs-to-many only)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub association_foreign_key: Option<String>,
	/// Whether related rows are removed by a cascading delete of this entity
	pub dependent: bool,
}

impl Association {
	pub fn new(class_name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
		Self {
			class_name: class_name.into(),
			foreign_key: foreign_key.into(),
			join_table: None,
			association_foreign_key: None,
			dependent: false,
		}
	}

	/// Configure the join table of a has-and-belongs-to-many relation
	pub fn through(
		mut self,
		join_table: impl Into<String>,
		association_foreign_key: impl Into<String>,
	) -> Self {
		self.join_table = Some(join_table.into());
		self.association_foreign_key = Some(association_foreign_key.into());
		self
	}

	/// Mark related rows as dependent (removed on cascade delete)
	pub fn dependent(mut self, dependent: bool) -> Self {
		self.dependent = dependent;
		self
	}
}

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
	Integer,
	Float,
	Boolean,
	String,
	Text,
	DateTime,
	Json,
}

impl FieldKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			FieldKind::Integer => "integer",
			FieldKind::Float => "float",
			FieldKind::Boolean => "boolean",
			FieldKind::String => "string",
			FieldKind::Text => "text",
			FieldKind::DateTime => "datetime",
			FieldKind::Json => "json",
		}
	}
}

/// Schema of a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
	pub name: String,
	pub kind: FieldKind,
	/// Null is an accepted value
	pub nullable: bool,
	/// Must be present and non-empty when a row is created
	pub required: bool,
}

impl FieldDescriptor {
	/// A non-nullable, optional field
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			nullable: false,
			required: false,
		}
	}

	pub fn nullable(mut self) -> Self {
		self.nullable = true;
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

/// Per-model admin settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
	/// Rows per page in the list view
	pub paginate_limit: u64,
	/// Whether single and batch deletes are allowed
	pub deletable: bool,
	/// Above this many related rows a belongs-to select becomes a type-ahead
	pub association_limit: u64,
}

impl Default for AdminSettings {
	fn default() -> Self {
		Self {
			paginate_limit: DEFAULT_PAGINATE_LIMIT,
			deletable: true,
			association_limit: DEFAULT_ASSOCIATION_LIMIT,
		}
	}
}

impl From<&CrudSettings> for AdminSettings {
	fn from(settings: &CrudSettings) -> Self {
		Self {
			paginate_limit: settings.paginate_limit,
			deletable: settings.deletable,
			association_limit: settings.association_limit,
		}
	}
}

/// Immutable description of an entity type
///
/// # Examples
///
/// ```
/// use admin_crud_core::descriptor::{Association, ModelDescriptor};
///
/// let post = ModelDescriptor::builder("Post")
///     .plugin("Blog")
///     .display_field("title")
///     .belongs_to("Category", Association::new("Blog.Category", "category_id"))
///     .build()
///     .unwrap();
///
/// assert_eq!(post.name(), "Blog.Post");
/// assert_eq!(post.url_slug(), "blog.post");
/// assert_eq!(post.singular_name(), "post");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
	plugin: Option<String>,
	alias: String,
	primary_key: String,
	display_field: String,
	singular_name: String,
	url_slug: String,
	fields: Vec<FieldDescriptor>,
	belongs_to: IndexMap<String, Association>,
	has_one: IndexMap<String, Association>,
	has_many: IndexMap<String, Association>,
	has_and_belongs_to_many: IndexMap<String, Association>,
	admin: AdminSettings,
}

impl ModelDescriptor {
	/// Start building a descriptor for the entity `alias`
	pub fn builder(alias: impl Into<String>) -> ModelDescriptorBuilder {
		ModelDescriptorBuilder::new(alias)
	}

	/// Registry name: `Plugin.Alias`, or the bare alias without a plugin
	pub fn name(&self) -> String {
		match &self.plugin {
			Some(plugin) => format!("{}.{}", plugin, self.alias),
			None => self.alias.clone(),
		}
	}

	pub fn plugin(&self) -> Option<&str> {
		self.plugin.as_deref()
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn primary_key(&self) -> &str {
		&self.primary_key
	}

	pub fn display_field(&self) -> &str {
		&self.display_field
	}

	pub fn singular_name(&self) -> &str {
		&self.singular_name
	}

	pub fn url_slug(&self) -> &str {
		&self.url_slug
	}

	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn admin(&self) -> &AdminSettings {
		&self.admin
	}

	pub fn belongs_to(&self) -> &IndexMap<String, Association> {
		&self.belongs_to
	}

	pub fn has_one(&self) -> &IndexMap<String, Association> {
		&self.has_one
	}

	pub fn has_many(&self) -> &IndexMap<String, Association> {
		&self.has_many
	}

	pub fn has_and_belongs_to_many(&self) -> &IndexMap<String, Association> {
		&self.has_and_belongs_to_many
	}

	/// Relation map of the given kind
	pub fn relations(&self, kind: RelationKind) -> &IndexMap<String, Association> {
		match kind {
			RelationKind::BelongsTo => &self.belongs_to,
			RelationKind::HasOne => &self.has_one,
			RelationKind::HasMany => &self.has_many,
			RelationKind::HasAndBelongsToMany => &self.has_and_belongs_to_many,
		}
	}

	/// Find a relation by alias regardless of its kind
	pub fn relation(&self, alias: &str) -> Option<(RelationKind, &Association)> {
		RelationKind::ALL
			.into_iter()
			.find_map(|kind| self.relations(kind).get(alias).map(|assoc| (kind, assoc)))
	}
}

/// Builder for [`ModelDescriptor`]
#[derive(Debug, Default)]
pub struct ModelDescriptorBuilder {
	alias: String,
	plugin: Option<String>,
	primary_key: Option<String>,
	display_field: Option<String>,
	singular_name: Option<String>,
	url_slug: Option<String>,
	fields: Vec<FieldDescriptor>,
	relations: Vec<(RelationKind, String, Association)>,
	admin: Option<AdminSettings>,
	paginate_limit: Option<u64>,
	deletable: Option<bool>,
	association_limit: Option<u64>,
}

impl ModelDescriptorBuilder {
	fn new(alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			..Self::default()
		}
	}

	/// Set the plugin the entity belongs to
	pub fn plugin(mut self, plugin: impl Into<String>) -> Self {
		self.plugin = Some(plugin.into());
		self
	}

	/// Set the primary key field
	///
	/// If not set, defaults to "id".
	pub fn primary_key(mut self, field: impl Into<String>) -> Self {
		self.primary_key = Some(field.into());
		self
	}

	/// Set the field used as a human readable label
	///
	/// If not set, defaults to `name` or `title` when such a field is
	/// declared, otherwise to the primary key.
	pub fn display_field(mut self, field: impl Into<String>) -> Self {
		self.display_field = Some(field.into());
		self
	}

	pub fn singular_name(mut self, name: impl Into<String>) -> Self {
		self.singular_name = Some(name.into());
		self
	}

	pub fn url_slug(mut self, slug: impl Into<String>) -> Self {
		self.url_slug = Some(slug.into());
		self
	}

	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	pub fn belongs_to(mut self, alias: impl Into<String>, association: Association) -> Self {
		self.relations
			.push((RelationKind::BelongsTo, alias.into(), association));
		self
	}

	pub fn has_one(mut self, alias: impl Into<String>, association: Association) -> Self {
		self.relations
			.push((RelationKind::HasOne, alias.into(), association));
		self
	}

	pub fn has_many(mut self, alias: impl Into<String>, association: Association) -> Self {
		self.relations
			.push((RelationKind::HasMany, alias.into(), association));
		self
	}

	pub fn has_and_belongs_to_many(
		mut self,
		alias: impl Into<String>,
		association: Association,
	) -> Self {
		self.relations
			.push((RelationKind::HasAndBelongsToMany, alias.into(), association));
		self
	}

	/// Replace the admin settings wholesale
	///
	/// Individual setters (`paginate_limit`, `deletable`, `association_limit`)
	/// still win over values given here.
	pub fn admin(mut self, admin: AdminSettings) -> Self {
		self.admin = Some(admin);
		self
	}

	pub fn paginate_limit(mut self, limit: u64) -> Self {
		self.paginate_limit = Some(limit);
		self
	}

	pub fn deletable(mut self, deletable: bool) -> Self {
		self.deletable = Some(deletable);
		self
	}

	pub fn association_limit(mut self, limit: u64) -> Self {
		self.association_limit = Some(limit);
		self
	}

	/// Validate and build the descriptor
	///
	/// # Errors
	///
	/// Returns [`CrudError::InvalidDescriptor`] when the alias is empty, a
	/// relation alias is declared twice, a has-and-belongs-to-many relation
	/// has no join table, a declared field list lacks the primary key or
	/// display field, or the pagination limit is zero.
	pub fn build(self) -> CrudResult<ModelDescriptor> {
		let alias = self.alias.trim().to_string();
		if alias.is_empty() {
			return Err(CrudError::InvalidDescriptor(
				"model alias must not be empty".into(),
			));
		}

		let primary_key = self.primary_key.unwrap_or_else(|| "id".into());
		let has_field = |name: &str| self.fields.iter().any(|f| f.name == name);
		let display_field = match self.display_field {
			Some(field) => field,
			None => ["name", "title"]
				.into_iter()
				.find(|candidate| has_field(*candidate))
				.map(str::to_string)
				.unwrap_or_else(|| primary_key.clone()),
		};

		if !self.fields.is_empty() {
			for required in [&primary_key, &display_field] {
				if !has_field(required.as_str()) {
					return Err(CrudError::InvalidDescriptor(format!(
						"{}: field '{}' is not declared",
						alias, required
					)));
				}
			}
		}

		let mut belongs_to = IndexMap::new();
		let mut has_one = IndexMap::new();
		let mut has_many = IndexMap::new();
		let mut has_and_belongs_to_many = IndexMap::new();
		for (kind, relation_alias, association) in self.relations {
			let duplicate = belongs_to.contains_key(&relation_alias)
				|| has_one.contains_key(&relation_alias)
				|| has_many.contains_key(&relation_alias)
				|| has_and_belongs_to_many.contains_key(&relation_alias);
			if duplicate {
				return Err(CrudError::InvalidDescriptor(format!(
					"{}: relation alias '{}' is declared more than once",
					alias, relation_alias
				)));
			}
			let missing_join = association.join_table.is_none()
				|| association.association_foreign_key.is_none();
			if kind == RelationKind::HasAndBelongsToMany && missing_join {
				return Err(CrudError::InvalidDescriptor(format!(
					"{}: relation '{}' needs a join table",
					alias, relation_alias
				)));
			}
			let target = match kind {
				RelationKind::BelongsTo => &mut belongs_to,
				RelationKind::HasOne => &mut has_one,
				RelationKind::HasMany => &mut has_many,
				RelationKind::HasAndBelongsToMany => &mut has_and_belongs_to_many,
			};
			target.insert(relation_alias, association);
		}

		let mut admin = self.admin.unwrap_or_default();
		if let Some(limit) = self.paginate_limit {
			admin.paginate_limit = limit;
		}
		if let Some(deletable) = self.deletable {
			admin.deletable = deletable;
		}
		if let Some(limit) = self.association_limit {
			admin.association_limit = limit;
		}
		if admin.paginate_limit == 0 {
			return Err(CrudError::InvalidDescriptor(format!(
				"{}: paginate limit must be greater than zero",
				alias
			)));
		}

		let url_slug = self.url_slug.unwrap_or_else(|| match &self.plugin {
			Some(plugin) => format!(
				"{}.{}",
				inflector::underscore(plugin),
				inflector::underscore(&alias)
			),
			None => inflector::underscore(&alias),
		});
		let singular_name = self
			.singular_name
			.unwrap_or_else(|| inflector::humanize(&alias));

		Ok(ModelDescriptor {
			plugin: self.plugin,
			alias,
			primary_key,
			display_field,
			singular_name,
			url_slug,
			fields: self.fields,
			belongs_to,
			has_one,
			has_many,
			has_and_belongs_to_many,
			admin,
		})
	}
}
