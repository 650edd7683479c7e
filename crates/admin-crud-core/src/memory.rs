//! In-memory repository
//!
//! Every registered entity gets a table of JSON rows and every
//! has-and-belongs-to-many relation a join table. Writes are staged on a copy
//! of all tables and swapped in under the write lock, so a failed atomic
//! save leaves nothing behind.

use crate::containment::Containment;
use crate::descriptor::{Association, FieldKind, ModelDescriptor, RelationKind};
use crate::error::{CrudError, CrudResult, SaveError, ValidationErrors};
use crate::record::{Fields, Record, Related, same_key, value_to_text};
use crate::registry::ModelRegistry;
use crate::repository::{
	Condition, FindOptions, Repository, RepositoryProvider, SaveOptions, SaveOutcome,
	SortDirection,
};
use crate::sanitizer::{PayloadSection, RequestPayload};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};

const REQUIRED: &str = "This field is required";
const NOT_NULL: &str = "This field cannot be null";

#[derive(Debug, Clone, Default)]
struct Tables {
	rows: IndexMap<String, Vec<Fields>>,
	joins: IndexMap<String, Vec<Fields>>,
}

impl Tables {
	fn rows(&self, class_name: &str) -> &[Fields] {
		self.rows.get(class_name).map(Vec::as_slice).unwrap_or(&[])
	}

	fn join_rows(&self, join_table: &str) -> &[Fields] {
		self.joins.get(join_table).map(Vec::as_slice).unwrap_or(&[])
	}

	fn find(&self, descriptor: &ModelDescriptor, id: &Value) -> Option<&Fields> {
		let pk = descriptor.primary_key();
		self.rows(&descriptor.name())
			.iter()
			.find(|row| row.get(pk).is_some_and(|value| same_key(value, id)))
	}

	fn find_mut(&mut self, descriptor: &ModelDescriptor, id: &Value) -> Option<&mut Fields> {
		let pk = descriptor.primary_key();
		self.rows
			.get_mut(&descriptor.name())?
			.iter_mut()
			.find(|row| row.get(pk).is_some_and(|value| same_key(value, id)))
	}

	/// Next integer key, `None` once the largest stored key is `i64::MAX`
	fn next_id(&self, descriptor: &ModelDescriptor) -> Option<Value> {
		let pk = descriptor.primary_key();
		let max = self
			.rows(&descriptor.name())
			.iter()
			.filter_map(|row| row.get(pk))
			.filter_map(as_integer)
			.max()
			.unwrap_or(0);
		max.checked_add(1).map(Value::from)
	}

	fn insert(&mut self, descriptor: &ModelDescriptor, row: Fields) {
		self.rows.entry(descriptor.name()).or_default().push(row);
	}
}

/// Shared in-memory storage for all registered entities
///
/// Cloning is cheap; clones share the same tables.
///
/// # Examples
///
/// ```
/// use admin_crud_core::descriptor::ModelDescriptor;
/// use admin_crud_core::memory::MemoryStore;
/// use admin_crud_core::registry::ModelRegistry;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let registry = Arc::new(ModelRegistry::new());
/// registry.register(ModelDescriptor::builder("Tag").build().unwrap()).unwrap();
///
/// let store = MemoryStore::new(registry);
/// let id = store
///     .insert("Tag", serde_json::from_value(json!({"name": "rust"})).unwrap())
///     .unwrap();
///
/// assert_eq!(id, json!(1));
/// assert_eq!(store.row_count("Tag"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
	registry: Arc<ModelRegistry>,
	tables: Arc<RwLock<Tables>>,
	read_only: Arc<AtomicBool>,
}

impl MemoryStore {
	pub fn new(registry: Arc<ModelRegistry>) -> Self {
		Self {
			registry,
			tables: Arc::new(RwLock::new(Tables::default())),
			read_only: Arc::new(AtomicBool::new(false)),
		}
	}

	pub fn registry(&self) -> &Arc<ModelRegistry> {
		&self.registry
	}

	/// Seed a row without validation and return its primary key
	///
	/// A missing primary key is assigned the next integer.
	pub fn insert(&self, class_name: &str, mut fields: Fields) -> CrudResult<Value> {
		let descriptor = self.registry.get(class_name)?;
		let pk = descriptor.primary_key();
		let mut tables = self.tables.write();
		let id = match fields.get(pk) {
			Some(id) if !id.is_null() => id.clone(),
			_ => {
				let id = tables.next_id(&descriptor).ok_or_else(|| {
					CrudError::Repository(key_space_exhausted(&descriptor))
				})?;
				fields.insert(pk.to_string(), id.clone());
				id
			}
		};
		tables.insert(&descriptor, fields);
		Ok(id)
	}

	/// Seed a join table row
	pub fn link(&self, join_table: &str, fields: Fields) {
		self.tables
			.write()
			.joins
			.entry(join_table.to_string())
			.or_default()
			.push(fields);
	}

	/// Snapshot of an entity's rows
	pub fn rows(&self, class_name: &str) -> Vec<Fields> {
		self.tables.read().rows(class_name).to_vec()
	}

	pub fn row_count(&self, class_name: &str) -> usize {
		self.tables.read().rows(class_name).len()
	}

	/// Snapshot of a join table
	pub fn join_rows(&self, join_table: &str) -> Vec<Fields> {
		self.tables.read().join_rows(join_table).to_vec()
	}

	/// Make every write fail with a storage error
	pub fn set_read_only(&self, read_only: bool) {
		self.read_only.store(read_only, atomic::Ordering::Relaxed);
	}

	fn is_read_only(&self) -> bool {
		self.read_only.load(atomic::Ordering::Relaxed)
	}
}

impl RepositoryProvider for MemoryStore {
	fn repository(&self, class_name: &str) -> CrudResult<Arc<dyn Repository>> {
		let descriptor = self.registry.get(class_name)?;
		Ok(Arc::new(MemoryRepository {
			store: self.clone(),
			descriptor,
		}))
	}
}

/// [`Repository`] view of one entity in a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryRepository {
	store: MemoryStore,
	descriptor: Arc<ModelDescriptor>,
}

#[async_trait]
impl Repository for MemoryRepository {
	fn descriptor(&self) -> Arc<ModelDescriptor> {
		Arc::clone(&self.descriptor)
	}

	async fn find_first(&self, options: &FindOptions) -> CrudResult<Option<Record>> {
		let options = options.clone().limit(1);
		Ok(self.find_all(&options).await?.into_iter().next())
	}

	async fn find_all(&self, options: &FindOptions) -> CrudResult<Vec<Record>> {
		let tables = self.store.tables.read();
		let mut rows: Vec<&Fields> = tables
			.rows(&self.descriptor.name())
			.iter()
			.filter(|row| matches_all(&options.conditions, row))
			.collect();
		if !options.order.is_empty() {
			rows.sort_by(|a, b| compare_rows(a, b, &options.order));
		}

		let offset = usize::try_from(options.offset).unwrap_or(usize::MAX);
		let limit = options
			.limit
			.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
		rows.into_iter()
			.skip(offset)
			.take(limit)
			.map(|row| {
				hydrate(
					&tables,
					&self.store.registry,
					&self.descriptor,
					row,
					&options.contain,
				)
			})
			.collect()
	}

	async fn count(&self, conditions: &[Condition]) -> CrudResult<u64> {
		let tables = self.store.tables.read();
		let count = tables
			.rows(&self.descriptor.name())
			.iter()
			.filter(|row| matches_all(conditions, row))
			.count();
		Ok(count as u64)
	}

	async fn save_associated(
		&self,
		payload: &RequestPayload,
		options: &SaveOptions,
	) -> Result<SaveOutcome, SaveError> {
		if self.store.is_read_only() {
			return Err(SaveError::Storage("store is read-only".into()));
		}

		let mut tables = self.store.tables.write();
		let mut staged = tables.clone();
		let mut writer = Writer {
			tables: &mut staged,
			registry: &self.store.registry,
			validate: options.validate,
			errors: ValidationErrors::new(),
		};
		let id = writer.save(&self.descriptor, payload, options)?;
		let errors = writer.errors;

		if !errors.is_empty() {
			if !options.atomic {
				*tables = staged;
			}
			tracing::debug!(
				model = %self.descriptor.name(),
				errors = errors.len(),
				atomic = options.atomic,
				"save rejected"
			);
			return Err(SaveError::Validation(errors));
		}

		let id = id.ok_or_else(|| SaveError::Storage("primary row was not written".into()))?;
		*tables = staged;
		Ok(SaveOutcome { id })
	}

	async fn delete(&self, id: &Value, cascade: bool) -> CrudResult<bool> {
		if self.store.is_read_only() {
			return Err(CrudError::Repository("store is read-only".into()));
		}

		let mut tables = self.store.tables.write();
		let mut staged = tables.clone();
		let deleted = delete_row(
			&mut staged,
			&self.store.registry,
			&self.descriptor,
			id,
			cascade,
		)?;
		if deleted {
			*tables = staged;
		}
		Ok(deleted)
	}
}

/// Applies one `save_associated` call to staged tables
struct Writer<'a> {
	tables: &'a mut Tables,
	registry: &'a ModelRegistry,
	validate: bool,
	errors: ValidationErrors,
}

impl Writer<'_> {
	/// Returns the primary key, or `None` when the primary row was rejected
	fn save(
		&mut self,
		descriptor: &ModelDescriptor,
		payload: &RequestPayload,
		options: &SaveOptions,
	) -> Result<Option<Value>, SaveError> {
		let alias = descriptor.alias();
		let mut primary = payload.fields(alias).cloned().unwrap_or_default();

		if options.deep {
			for (relation, association) in descriptor.belongs_to() {
				let Some(section) = payload.fields(relation).filter(|s| !s.is_empty()) else {
					continue;
				};
				let parent = self.registry.related(association).map_err(storage)?;
				if let Some(parent_id) = self.upsert(&parent, section.clone(), relation, None)? {
					primary.insert(association.foreign_key.clone(), parent_id);
				}
			}
		}

		let Some(id) = self.upsert(descriptor, primary, alias, options.id.as_ref())? else {
			return Ok(None);
		};

		if options.deep {
			self.save_children(descriptor, payload, &id)?;
			self.save_links(descriptor, payload, &id)?;
		}
		Ok(Some(id))
	}

	fn save_children(
		&mut self,
		descriptor: &ModelDescriptor,
		payload: &RequestPayload,
		id: &Value,
	) -> Result<(), SaveError> {
		for kind in [RelationKind::HasOne, RelationKind::HasMany] {
			for (relation, association) in descriptor.relations(kind) {
				let Some(section) = payload.section(relation) else {
					continue;
				};
				let child = self.registry.related(association).map_err(storage)?;
				let rows: Vec<(String, Fields)> = match section {
					PayloadSection::Fields(fields) => vec![(relation.clone(), fields.clone())],
					PayloadSection::Rows(rows) => rows
						.iter()
						.enumerate()
						.map(|(index, row)| (format!("{}.{}", relation, index), row.clone()))
						.collect(),
				};
				for (key, mut row) in rows {
					if row.is_empty() {
						continue;
					}
					row.insert(association.foreign_key.clone(), id.clone());
					self.upsert(&child, row, &key, None)?;
				}
			}
		}
		Ok(())
	}

	/// Replace the join rows of every submitted has-and-belongs-to-many section
	fn save_links(
		&mut self,
		descriptor: &ModelDescriptor,
		payload: &RequestPayload,
		id: &Value,
	) -> Result<(), SaveError> {
		for (relation, association) in descriptor.has_and_belongs_to_many() {
			let Some(section) = payload.section(relation) else {
				continue;
			};
			let (Some(join_table), Some(association_fk)) = (
				&association.join_table,
				&association.association_foreign_key,
			) else {
				continue;
			};
			let partner = self.registry.related(association).map_err(storage)?;
			let ids = submitted_links(section, relation, partner.primary_key());

			if self.validate {
				let before = self.errors.len();
				for related_id in &ids {
					if self.tables.find(&partner, related_id).is_none() {
						self.errors.add(
							relation.as_str(),
							relation.as_str(),
							format!(
								"{} does not reference an existing {}",
								value_to_text(related_id),
								relation
							),
						);
					}
				}
				if self.errors.len() != before {
					continue;
				}
			}

			let joins = self.tables.joins.entry(join_table.clone()).or_default();
			joins.retain(|row| !references(row, &association.foreign_key, id));
			for related_id in ids {
				joins.push(Fields::from_iter([
					(association.foreign_key.clone(), id.clone()),
					(association_fk.clone(), related_id),
				]));
			}
		}
		Ok(())
	}

	/// Create or update one row; `None` when it failed validation
	fn upsert(
		&mut self,
		descriptor: &ModelDescriptor,
		mut fields: Fields,
		key: &str,
		explicit_id: Option<&Value>,
	) -> Result<Option<Value>, SaveError> {
		let pk = descriptor.primary_key();
		let submitted_id = explicit_id
			.cloned()
			.or_else(|| fields.get(pk).filter(|value| !is_blank(value)).cloned());
		fields.shift_remove(pk);

		let existing = submitted_id
			.as_ref()
			.filter(|id| self.tables.find(descriptor, id).is_some())
			.cloned();
		if let (Some(id), None) = (explicit_id, &existing) {
			return Err(SaveError::Storage(format!(
				"{} with ID {} does not exist",
				descriptor.alias(),
				value_to_text(id)
			)));
		}

		if self.validate && !self.validate_row(descriptor, &fields, existing.is_none(), key)? {
			return Ok(None);
		}

		match existing {
			Some(id) => {
				if let Some(row) = self.tables.find_mut(descriptor, &id) {
					row.extend(fields);
				}
				Ok(Some(id))
			}
			None => {
				let id = match submitted_id {
					Some(id) => id,
					None => self
						.tables
						.next_id(descriptor)
						.ok_or_else(|| SaveError::Storage(key_space_exhausted(descriptor)))?,
				};
				let mut row: Fields = descriptor
					.fields()
					.iter()
					.map(|field| (field.name.clone(), Value::Null))
					.collect();
				row.insert(pk.to_string(), id.clone());
				row.extend(fields);
				self.tables.insert(descriptor, row);
				Ok(Some(id))
			}
		}
	}

	fn validate_row(
		&mut self,
		descriptor: &ModelDescriptor,
		fields: &Fields,
		creating: bool,
		key: &str,
	) -> Result<bool, SaveError> {
		let before = self.errors.len();

		for field in descriptor.fields() {
			if field.name == descriptor.primary_key() {
				continue;
			}
			match fields.get(&field.name) {
				None if creating && field.required => {
					self.errors.add(key, field.name.as_str(), REQUIRED);
				}
				None => {}
				Some(Value::Null) if !field.nullable => {
					self.errors.add(key, field.name.as_str(), NOT_NULL);
				}
				Some(value) if is_blank(value) => {
					if field.required {
						self.errors.add(key, field.name.as_str(), REQUIRED);
					}
				}
				Some(value) if !kind_accepts(field.kind, value) => {
					self.errors.add(
						key,
						field.name.as_str(),
						format!("Must be a valid {}", field.kind.as_str()),
					);
				}
				Some(_) => {}
			}
		}

		for (relation, association) in descriptor.belongs_to() {
			let Some(value) = fields.get(&association.foreign_key) else {
				continue;
			};
			if is_blank(value) || self.errors.field(key, &association.foreign_key).is_some() {
				continue;
			}
			let parent = self.registry.related(association).map_err(storage)?;
			if self.tables.find(&parent, value).is_none() {
				self.errors.add(
					key,
					association.foreign_key.as_str(),
					format!("Does not reference an existing {}", relation),
				);
			}
		}

		Ok(self.errors.len() == before)
	}
}

fn key_space_exhausted(descriptor: &ModelDescriptor) -> String {
	format!("{} has no integer key left to assign", descriptor.alias())
}

fn storage(err: CrudError) -> SaveError {
	SaveError::Storage(err.to_string())
}

fn as_integer(value: &Value) -> Option<i64> {
	value
		.as_i64()
		.or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.trim().is_empty(),
		_ => false,
	}
}

fn kind_accepts(kind: FieldKind, value: &Value) -> bool {
	match kind {
		FieldKind::Integer => as_integer(value).is_some() || value.is_u64(),
		FieldKind::Float => {
			value.is_number() || value.as_str().is_some_and(|s| s.trim().parse::<f64>().is_ok())
		}
		FieldKind::Boolean => match value {
			Value::Bool(_) => true,
			Value::Number(n) => matches!(n.as_u64(), Some(0 | 1)),
			Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
			_ => false,
		},
		FieldKind::String | FieldKind::Text | FieldKind::DateTime => {
			value.is_string() || value.is_number()
		}
		FieldKind::Json => true,
	}
}

fn matches_all(conditions: &[Condition], row: &Fields) -> bool {
	conditions.iter().all(|condition| condition.matches(row))
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
	match (left.as_f64(), right.as_f64()) {
		(Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
		_ => value_to_text(left).cmp(&value_to_text(right)),
	}
}

fn compare_rows(left: &Fields, right: &Fields, order: &[(String, SortDirection)]) -> Ordering {
	for (field, direction) in order {
		let ordering = compare_values(
			left.get(field).unwrap_or(&Value::Null),
			right.get(field).unwrap_or(&Value::Null),
		);
		let ordering = match direction {
			SortDirection::Asc => ordering,
			SortDirection::Desc => ordering.reverse(),
		};
		if ordering != Ordering::Equal {
			return ordering;
		}
	}
	Ordering::Equal
}

/// Row holds `id` in its `foreign_key` column
fn references(row: &Fields, foreign_key: &str, id: &Value) -> bool {
	!id.is_null() && row.get(foreign_key).is_some_and(|value| same_key(value, id))
}

fn linked_ids(tables: &Tables, association: &Association, id: &Value) -> Vec<Value> {
	let (Some(join_table), Some(association_fk)) = (
		&association.join_table,
		&association.association_foreign_key,
	) else {
		return Vec::new();
	};
	tables
		.join_rows(join_table)
		.iter()
		.filter(|row| references(row, &association.foreign_key, id))
		.filter_map(|row| row.get(association_fk).cloned())
		.collect()
}

/// Related ids of a has-and-belongs-to-many section
///
/// Accepts `{Tag: {Tag: [1, 2]}}` as well as `{Tag: [{id: 1}, {id: 2}]}`.
fn submitted_links(section: &PayloadSection, relation: &str, pk: &str) -> Vec<Value> {
	let values = match section {
		PayloadSection::Fields(fields) => match fields.get(relation) {
			Some(Value::Array(items)) => items.clone(),
			Some(other) => vec![other.clone()],
			None => Vec::new(),
		},
		PayloadSection::Rows(rows) => rows.iter().filter_map(|row| row.get(pk).cloned()).collect(),
	};
	values.into_iter().filter(|value| !is_blank(value)).collect()
}

/// Build a record and attach the contained relations
fn hydrate(
	tables: &Tables,
	registry: &ModelRegistry,
	descriptor: &ModelDescriptor,
	fields: &Fields,
	contain: &Containment,
) -> CrudResult<Record> {
	let mut record = Record::from_fields(descriptor.alias(), fields.clone());
	let id = fields
		.get(descriptor.primary_key())
		.cloned()
		.unwrap_or(Value::Null);

	for (alias, nested) in contain.iter() {
		let Some((kind, association)) = descriptor.relation(alias) else {
			return Err(CrudError::Repository(format!(
				"{} has no relation '{}'",
				descriptor.name(),
				alias
			)));
		};
		let related = registry.related(association)?;
		let mut inner = Containment::none();
		for nested_alias in nested {
			inner.insert(nested_alias.clone(), Vec::new());
		}
		let to_record = |row: &Fields| hydrate(tables, registry, &related, row, &inner);

		let value = match kind {
			RelationKind::BelongsTo => {
				let parent = fields
					.get(&association.foreign_key)
					.filter(|fk| !fk.is_null())
					.and_then(|fk| tables.find(&related, fk));
				Related::One(parent.map(to_record).transpose()?.map(Box::new))
			}
			RelationKind::HasOne => {
				let child = tables
					.rows(&related.name())
					.iter()
					.find(|row| references(row, &association.foreign_key, &id));
				Related::One(child.map(to_record).transpose()?.map(Box::new))
			}
			RelationKind::HasMany => Related::Many(
				tables
					.rows(&related.name())
					.iter()
					.filter(|row| references(row, &association.foreign_key, &id))
					.map(to_record)
					.collect::<CrudResult<_>>()?,
			),
			RelationKind::HasAndBelongsToMany => {
				let linked = linked_ids(tables, association, &id);
				let pk = related.primary_key();
				Related::Many(
					tables
						.rows(&related.name())
						.iter()
						.filter(|row| {
							row.get(pk)
								.is_some_and(|value| linked.iter().any(|l| same_key(l, value)))
						})
						.map(to_record)
						.collect::<CrudResult<_>>()?,
				)
			}
		};
		record.set_related(alias, value);
	}
	Ok(record)
}

/// Remove a row, and with `cascade` its dependent children and join rows
fn delete_row(
	tables: &mut Tables,
	registry: &ModelRegistry,
	descriptor: &ModelDescriptor,
	id: &Value,
	cascade: bool,
) -> CrudResult<bool> {
	let pk = descriptor.primary_key();
	let Some(rows) = tables.rows.get_mut(&descriptor.name()) else {
		return Ok(false);
	};
	let before = rows.len();
	rows.retain(|row| !row.get(pk).is_some_and(|value| same_key(value, id)));
	if rows.len() == before {
		return Ok(false);
	}

	if cascade {
		for kind in [RelationKind::HasOne, RelationKind::HasMany] {
			for association in descriptor.relations(kind).values().filter(|a| a.dependent) {
				let child = registry.related(association)?;
				let child_pk = child.primary_key();
				let child_ids: Vec<Value> = tables
					.rows(&child.name())
					.iter()
					.filter(|row| references(row, &association.foreign_key, id))
					.filter_map(|row| row.get(child_pk).cloned())
					.collect();
				for child_id in child_ids {
					delete_row(tables, registry, &child, &child_id, true)?;
				}
			}
		}
		for association in descriptor.has_and_belongs_to_many().values() {
			if let Some(join_table) = &association.join_table
				&& let Some(joins) = tables.joins.get_mut(join_table)
			{
				joins.retain(|row| !references(row, &association.foreign_key, id));
			}
		}
	}
	Ok(true)
}
