//! Admin CRUD controller
//!
//! This crate provides the request-facing half of the admin CRUD controller:
//!
//! - `controller` - list, create, read, update, delete and type-ahead actions
//! - `routes` - action names, allowed methods, URL building and dispatch
//! - `request` / `outcome` - what an action receives and returns
//! - `error` - conversion of `CrudError` into client-safe HTTP errors
//!
//! # Example
//!
//! ```
//! use admin_crud_core::{CrudSettings, MemoryStore, ModelDescriptor, ModelRegistry, ViewContext};
//! use admin_crud_server::{CrudController, CrudRequest};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register(ModelDescriptor::builder("Tag").build().unwrap()).unwrap();
//! let store = MemoryStore::new(Arc::clone(&registry));
//! let controller = CrudController::new(registry, Arc::new(store), CrudSettings::default());
//!
//! let mut view = ViewContext::new();
//! let outcome = controller
//!     .handle("/admin/tag", &CrudRequest::get(), &mut view)
//!     .await
//!     .unwrap();
//! assert_eq!(outcome.view(), Some("index"));
//! # });
//! ```

pub mod controller;
pub mod error;
pub mod outcome;
pub mod request;
pub mod routes;

// Re-exports
pub use controller::{CrudController, Pagination};
pub use error::{HttpError, IntoHttpError, MapHttpError};
pub use outcome::{ActionOutcome, FlashClass, FlashMessage};
pub use request::CrudRequest;
pub use routes::{CrudAction, CrudRoute, action_url, allowed_actions};
