//! Controller actions, routing and HTTP error mapping.
//!
//! # Examples
//!
//! ```rust
//! use admin_crud::server::routes::{CrudAction, CrudRoute};
//!
//! let route = CrudRoute::parse_path("/admin", "/admin/post/delete/3").unwrap();
//! assert_eq!(route.action, CrudAction::Delete);
//! ```

#[cfg(feature = "server")]
pub use admin_crud_server::*;
