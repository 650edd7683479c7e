//! Relation containment
//!
//! Decides which related entities are eagerly loaded alongside a record.
//! Containment never reaches further than two levels: the direct relations
//! of the entity, plus the belongs-to parents of its has-one/has-many
//! children.

use crate::descriptor::ModelDescriptor;
use crate::error::CrudResult;
use crate::registry::ModelRegistry;
use indexmap::IndexMap;
use serde::Serialize;

/// Eager-load directive: relation alias → aliases contained beneath it
///
/// A first-level alias with an empty nested list loads the related rows
/// only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Containment(IndexMap<String, Vec<String>>);

impl Containment {
	/// Contain nothing
	pub fn none() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, alias: impl Into<String>, nested: Vec<String>) {
		self.0.insert(alias.into(), nested);
	}

	pub fn contains(&self, alias: &str) -> bool {
		self.0.contains_key(alias)
	}

	/// Aliases contained beneath `alias`
	pub fn nested(&self, alias: &str) -> &[String] {
		self.0.get(alias).map(Vec::as_slice).unwrap_or(&[])
	}

	/// First-level aliases in declaration order
	pub fn aliases(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Every alias (and nested alias) of `self` is also in `other`
	pub fn is_subset_of(&self, other: &Containment) -> bool {
		self.0.iter().all(|(alias, nested)| {
			other.contains(alias)
				&& nested
					.iter()
					.all(|inner| other.nested(alias).contains(inner))
		})
	}
}

/// Direct parents and many-to-many partners of `descriptor`
///
/// Keys of `belongs_to` followed by keys of `has_and_belongs_to_many`. Used
/// by the list and update views, which only need labels for dropdowns.
pub fn shallow_contain(descriptor: &ModelDescriptor) -> Containment {
	let mut containment = Containment::none();
	for alias in descriptor
		.belongs_to()
		.keys()
		.chain(descriptor.has_and_belongs_to_many().keys())
	{
		containment.insert(alias.clone(), Vec::new());
	}
	containment
}

/// [`shallow_contain`] plus every has-one/has-many child with its own parents
///
/// Used by the read view so second-level parent labels are available.
///
/// # Errors
///
/// Returns [`CrudError::ModelNotRegistered`](crate::error::CrudError::ModelNotRegistered)
/// when a child entity is not in the registry.
pub fn deep_contain(
	descriptor: &ModelDescriptor,
	registry: &ModelRegistry,
) -> CrudResult<Containment> {
	let mut containment = shallow_contain(descriptor);
	for (alias, association) in descriptor
		.has_one()
		.iter()
		.chain(descriptor.has_many().iter())
	{
		let child = registry.related(association)?;
		let parents = child.belongs_to().keys().cloned().collect();
		containment.insert(alias.clone(), parents);
	}
	Ok(containment)
}
