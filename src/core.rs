//! Model descriptors, containment, payload sanitization and storage contracts.
//!
//! # Examples
//!
//! ```rust
//! use admin_crud::core::containment::shallow_contain;
//! use admin_crud::core::descriptor::{Association, ModelDescriptor};
//!
//! let post = ModelDescriptor::builder("Post")
//!     .belongs_to("Category", Association::new("Category", "category_id"))
//!     .build()
//!     .unwrap();
//! assert!(shallow_contain(&post).contains("Category"));
//! ```

#[cfg(feature = "core")]
pub use admin_crud_core::*;
