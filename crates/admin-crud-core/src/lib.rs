//! Core of the admin CRUD controller
//!
//! This crate holds everything the controller actions build on:
//!
//! - `descriptor` / `registry` - static model descriptions and their lookup
//! - `containment` - which related rows are eagerly loaded per view
//! - `associated` - select options and type-ahead widgets for forms
//! - `sanitizer` - control-field handling of submitted payloads
//! - `repository` / `presenter` - storage and rendering contracts
//! - `memory` - an in-memory repository with transactional saves
//! - `settings` / `logging` - configuration and tracing setup
//!
//! # Example
//!
//! ```
//! use admin_crud_core::containment::shallow_contain;
//! use admin_crud_core::descriptor::{Association, ModelDescriptor};
//!
//! let post = ModelDescriptor::builder("Post")
//!     .belongs_to("Author", Association::new("User", "author_id"))
//!     .build()
//!     .unwrap();
//!
//! assert!(shallow_contain(&post).contains("Author"));
//! ```

pub mod associated;
pub mod containment;
pub mod descriptor;
pub mod error;
pub mod inflector;
pub mod logging;
pub mod memory;
pub mod presenter;
pub mod record;
pub mod registry;
pub mod repository;
pub mod sanitizer;
pub mod settings;

// Re-exports
pub use associated::{AssociatedData, TypeAheadDescriptor, prepare_associated_data};
pub use containment::{Containment, deep_contain, shallow_contain};
pub use descriptor::{
	AdminSettings, Association, FieldDescriptor, FieldKind, ModelDescriptor, RelationKind,
};
pub use error::{CrudError, CrudResult, SaveError, ValidationErrors};
pub use memory::MemoryStore;
pub use presenter::{Layout, Presenter, ViewContext, ViewMode};
pub use record::{Fields, Record, Related};
pub use registry::ModelRegistry;
pub use repository::{
	Condition, FindOptions, Repository, RepositoryProvider, SaveOptions, SaveOutcome,
	SortDirection,
};
pub use sanitizer::{PayloadSection, RequestPayload};
pub use settings::{CrudSettings, LoggingSettings};
