//! Registry of model descriptors
//!
//! Populated at startup; route handlers resolve the `model` route parameter
//! (`plugin.model_name`) against it before any action runs.

use crate::descriptor::{Association, ModelDescriptor, RelationKind};
use crate::error::{CrudError, CrudResult};
use crate::inflector;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Model descriptor registry
///
/// # Examples
///
/// ```
/// use admin_crud_core::descriptor::ModelDescriptor;
/// use admin_crud_core::registry::ModelRegistry;
///
/// let registry = ModelRegistry::new();
/// registry
///     .register(ModelDescriptor::builder("BlogPost").plugin("Admin").build().unwrap())
///     .unwrap();
///
/// let descriptor = registry.resolve("admin.blog_post").unwrap();
/// assert_eq!(descriptor.name(), "Admin.BlogPost");
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
	models: RwLock<IndexMap<String, Arc<ModelDescriptor>>>,
}

impl ModelRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a descriptor under its `Plugin.Alias` name
	///
	/// # Errors
	///
	/// Returns [`CrudError::InvalidDescriptor`] when the name or URL slug is
	/// already taken.
	pub fn register(&self, descriptor: ModelDescriptor) -> CrudResult<Arc<ModelDescriptor>> {
		let name = descriptor.name();
		let mut models = self.models.write();
		if models.contains_key(&name) {
			return Err(CrudError::InvalidDescriptor(format!(
				"model '{}' is already registered",
				name
			)));
		}
		if let Some(existing) = models
			.values()
			.find(|existing| existing.url_slug() == descriptor.url_slug())
		{
			return Err(CrudError::InvalidDescriptor(format!(
				"URL slug '{}' of '{}' is already used by '{}'",
				descriptor.url_slug(),
				name,
				existing.name()
			)));
		}
		let descriptor = Arc::new(descriptor);
		models.insert(name.clone(), Arc::clone(&descriptor));
		tracing::debug!(model = %name, slug = %descriptor.url_slug(), "registered admin model");
		Ok(descriptor)
	}

	/// Look up a descriptor by its exact registry name
	pub fn get(&self, name: &str) -> CrudResult<Arc<ModelDescriptor>> {
		self.models
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| CrudError::ModelNotRegistered(name.to_string()))
	}

	/// Resolve a route `model` parameter
	///
	/// The parameter is split on its first `.` into plugin and model, each
	/// camel-cased (`admin.blog_post` → `Admin.BlogPost`). A parameter
	/// without a plugin is camel-cased as a whole. URL slugs resolve too.
	pub fn resolve(&self, route_model: &str) -> CrudResult<Arc<ModelDescriptor>> {
		let route_model = route_model.trim();
		let candidate = match route_model.split_once('.') {
			Some((plugin, model)) => {
				format!("{}.{}", inflector::camelize(plugin), inflector::camelize(model))
			}
			None => inflector::camelize(route_model),
		};

		let models = self.models.read();
		models
			.get(route_model)
			.or_else(|| models.get(&candidate))
			.or_else(|| models.values().find(|d| d.url_slug() == route_model))
			.cloned()
			.ok_or_else(|| CrudError::ModelNotRegistered(route_model.to_string()))
	}

	/// Descriptor on the other side of an association
	pub fn related(&self, association: &Association) -> CrudResult<Arc<ModelDescriptor>> {
		self.get(&association.class_name)
	}

	/// Names of all registered models, in registration order
	pub fn registered_models(&self) -> Vec<String> {
		self.models.read().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.models.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.read().is_empty()
	}

	/// Check that every association points at a registered model
	///
	/// Call once after startup registration is complete.
	pub fn validate(&self) -> CrudResult<()> {
		let models = self.models.read();
		for descriptor in models.values() {
			for kind in RelationKind::ALL {
				for (alias, association) in descriptor.relations(kind) {
					if !models.contains_key(&association.class_name) {
						return Err(CrudError::ModelNotRegistered(format!(
							"{} (relation '{}' of '{}')",
							association.class_name,
							alias,
							descriptor.name()
						)));
					}
				}
			}
		}
		Ok(())
	}
}
