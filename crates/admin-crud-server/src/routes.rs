//! Action routing
//!
//! Admin URLs have the shape `{prefix}/{model}[/{action}[/{id}]]`, where
//! `model` is the `plugin.model_name` route parameter or a URL slug.

use crate::controller::CrudController;
use crate::error::{HttpError, MapHttpError};
use crate::outcome::ActionOutcome;
use crate::request::CrudRequest;
use admin_crud_core::descriptor::ModelDescriptor;
use admin_crud_core::presenter::Presenter;
use admin_crud_core::record::value_to_text;
use admin_crud_core::{CrudError, CrudResult};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Controller action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
	Index,
	Create,
	Read,
	Update,
	Delete,
	TypeAhead,
}

impl CrudAction {
	pub const ALL: [CrudAction; 6] = [
		CrudAction::Index,
		CrudAction::Create,
		CrudAction::Read,
		CrudAction::Update,
		CrudAction::Delete,
		CrudAction::TypeAhead,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			CrudAction::Index => "index",
			CrudAction::Create => "create",
			CrudAction::Read => "read",
			CrudAction::Update => "update",
			CrudAction::Delete => "delete",
			CrudAction::TypeAhead => "type_ahead",
		}
	}

	/// Actions addressing a single record by primary key
	pub fn takes_id(&self) -> bool {
		matches!(self, CrudAction::Read | CrudAction::Update | CrudAction::Delete)
	}

	/// HTTP methods the action answers to
	pub fn allows(&self, method: &Method) -> bool {
		match self {
			CrudAction::Index | CrudAction::Create | CrudAction::Delete => {
				method == Method::GET || method == Method::POST
			}
			CrudAction::Update => {
				method == Method::GET || method == Method::POST || method == Method::PUT
			}
			CrudAction::Read | CrudAction::TypeAhead => method == Method::GET,
		}
	}
}

impl fmt::Display for CrudAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for CrudAction {
	type Err = CrudError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		CrudAction::ALL
			.into_iter()
			.find(|action| action.as_str() == s)
			.ok_or_else(|| CrudError::BadRequest(format!("unknown action '{}'", s)))
	}
}

/// Actions reachable without authentication at this layer
///
/// Every action is public; access control belongs to the host's middleware.
pub fn allowed_actions() -> &'static [CrudAction] {
	&CrudAction::ALL
}

/// URL of `action` for `descriptor`
///
/// `index` maps to the model root; `read`, `update` and `delete` get the
/// record id appended when one is given.
pub fn action_url(
	url_prefix: &str,
	descriptor: &ModelDescriptor,
	action: CrudAction,
	id: Option<&Value>,
) -> String {
	let base = format!("{}/{}", url_prefix.trim_end_matches('/'), descriptor.url_slug());
	match (action, id) {
		(CrudAction::Index, _) => base,
		(action, Some(id)) if action.takes_id() => {
			format!("{}/{}/{}", base, action, value_to_text(id))
		}
		(action, _) => format!("{}/{}", base, action),
	}
}

/// Parsed admin route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudRoute {
	pub model: String,
	pub action: CrudAction,
	pub id: Option<String>,
}

impl CrudRoute {
	pub fn new(model: impl Into<String>, action: CrudAction) -> Self {
		Self {
			model: model.into(),
			action,
			id: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// Parse a request path mounted under `url_prefix`
	///
	/// ```
	/// use admin_crud_server::routes::{CrudAction, CrudRoute};
	///
	/// let route = CrudRoute::parse_path("/admin", "/admin/blog.post/update/7").unwrap();
	/// assert_eq!(route.model, "blog.post");
	/// assert_eq!(route.action, CrudAction::Update);
	/// assert_eq!(route.id.as_deref(), Some("7"));
	/// ```
	pub fn parse_path(url_prefix: &str, path: &str) -> CrudResult<Self> {
		let prefix = url_prefix.trim_end_matches('/');
		let rest = path
			.strip_prefix(prefix)
			.filter(|rest| rest.is_empty() || rest.starts_with('/'))
			.ok_or_else(|| {
				CrudError::BadRequest(format!("'{}' is not under '{}'", path, url_prefix))
			})?;

		let mut segments = rest.split('/').filter(|segment| !segment.is_empty());
		let model = segments
			.next()
			.ok_or_else(|| CrudError::BadRequest("missing model in admin path".into()))?;
		let action = match segments.next() {
			Some(action) => action.parse()?,
			None => CrudAction::Index,
		};
		let id = segments.next().map(str::to_string);
		if segments.next().is_some() {
			return Err(CrudError::BadRequest(format!("unexpected trailing segments in '{}'", path)));
		}

		Ok(Self {
			model: model.to_string(),
			action,
			id,
		})
	}
}

impl CrudController {
	/// Run the action named by `route`
	///
	/// # Errors
	///
	/// Returns [`CrudError::BadRequest`] when the action does not accept the
	/// request method or needs a record id the route lacks.
	pub async fn dispatch(
		&self,
		route: &CrudRoute,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let action = route.action;
		if !action.allows(&request.method) {
			return Err(CrudError::BadRequest(format!(
				"{} does not accept {}",
				action, request.method
			)));
		}
		let id = || {
			route
				.id
				.as_deref()
				.ok_or_else(|| CrudError::BadRequest(format!("{} needs a record id", action)))
		};

		match action {
			CrudAction::Index => self.index(&route.model, request, presenter).await,
			CrudAction::Create => self.create(&route.model, request, presenter).await,
			CrudAction::Read => self.read(&route.model, id()?, presenter).await,
			CrudAction::Update => self.update(&route.model, id()?, request, presenter).await,
			CrudAction::Delete => self.delete(&route.model, id()?, request, presenter).await,
			CrudAction::TypeAhead => self.type_ahead(&route.model, request, presenter).await,
		}
	}

	/// Parse `path` under the configured prefix, dispatch, and map errors
	/// to client-safe HTTP errors
	pub async fn handle(
		&self,
		path: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> Result<ActionOutcome, HttpError> {
		let result = match CrudRoute::parse_path(&self.settings().url_prefix, path) {
			Ok(route) => self.dispatch(&route, request, presenter).await,
			Err(err) => Err(err),
		};
		if let Err(err) = &result {
			match err {
				CrudError::NotFound { .. }
				| CrudError::Forbidden(_)
				| CrudError::BadRequest(_)
				| CrudError::ModelNotRegistered(_) => {
					tracing::debug!(path, error = %err, "admin request rejected");
				}
				_ => tracing::error!(path, error = %err, "admin request failed"),
			}
		}
		result.map_http_error()
	}
}
