//! # Admin CRUD
//!
//! A generic administration controller: given a static description of an
//! entity type and its relations, it serves list, create, read, update,
//! delete and type-ahead actions over any storage that implements the
//! repository contract.
//!
//! ## Feature Flags
//!
//! - `core` - descriptors, containment, sanitizer, repository contracts and
//!   the in-memory store
//! - `server` - controller actions, routing and HTTP error mapping
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust
//! use admin_crud::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let registry = Arc::new(ModelRegistry::new());
//! registry
//!     .register(
//!         ModelDescriptor::builder("Tag")
//!             .field(FieldDescriptor::new("id", FieldKind::Integer))
//!             .field(FieldDescriptor::new("name", FieldKind::String))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//! let store = MemoryStore::new(Arc::clone(&registry));
//! store.insert("Tag", serde_json::from_value(serde_json::json!({"name": "rust"})).unwrap()).unwrap();
//!
//! let controller = CrudController::new(registry, Arc::new(store), CrudSettings::default());
//! let mut view = ViewContext::new();
//! let outcome = controller
//!     .handle("/admin/tag/read/1", &CrudRequest::get(), &mut view)
//!     .await
//!     .unwrap();
//! assert_eq!(outcome.view(), Some("read"));
//! # });
//! ```

#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "server")]
pub mod server;

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "core")]
	pub use admin_crud_core::{
		Association, CrudError, CrudResult, CrudSettings, FieldDescriptor, FieldKind,
		MemoryStore, ModelDescriptor, ModelRegistry, Presenter, Repository, RepositoryProvider,
		RequestPayload, ViewContext,
	};
	#[cfg(feature = "server")]
	pub use admin_crud_server::{ActionOutcome, CrudAction, CrudController, CrudRequest, HttpError};
}
