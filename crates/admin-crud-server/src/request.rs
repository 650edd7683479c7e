//! Incoming request as seen by the controller

use admin_crud_core::sanitizer::RequestPayload;
use admin_crud_core::{CrudError, CrudResult};
use http::Method;
use indexmap::IndexMap;

/// HTTP method, query parameters and decoded body of one admin request
#[derive(Debug, Clone, PartialEq)]
pub struct CrudRequest {
	pub method: Method,
	pub query: IndexMap<String, String>,
	pub payload: RequestPayload,
	/// Action to redirect to after a successful mutation; wins over the
	/// payload's `redirect_to` field
	pub redirect: Option<String>,
}

impl Default for CrudRequest {
	fn default() -> Self {
		Self::get()
	}
}

impl CrudRequest {
	pub fn new(method: Method, payload: RequestPayload) -> Self {
		Self {
			method,
			query: IndexMap::new(),
			payload,
			redirect: None,
		}
	}

	pub fn get() -> Self {
		Self::new(Method::GET, RequestPayload::new())
	}

	pub fn post(payload: RequestPayload) -> Self {
		Self::new(Method::POST, payload)
	}

	pub fn put(payload: RequestPayload) -> Self {
		Self::new(Method::PUT, payload)
	}

	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(name.into(), value.into());
		self
	}

	/// Replace the query parameters with a decoded `a=1&b=2` string
	pub fn with_query_string(mut self, query: &str) -> CrudResult<Self> {
		let query = query.trim_start_matches('?');
		self.query = serde_urlencoded::from_str(query)
			.map_err(|e| CrudError::BadRequest(format!("malformed query string: {}", e)))?;
		Ok(self)
	}

	pub fn with_redirect(mut self, action: impl Into<String>) -> Self {
		self.redirect = Some(action.into());
		self
	}

	pub fn query(&self, name: &str) -> Option<&str> {
		self.query.get(name).map(String::as_str)
	}

	pub fn is_post(&self) -> bool {
		self.method == Method::POST
	}

	/// POST or PUT, both of which submit an update form
	pub fn is_submission(&self) -> bool {
		self.method == Method::POST || self.method == Method::PUT
	}
}
