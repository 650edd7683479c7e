//! Rendering contract
//!
//! Actions stage variables and pick a view on a [`Presenter`]; the host turns
//! that into a response after the action returns.

use crate::error::{CrudError, CrudResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Output format of the rendered view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	Html,
	Json,
}

/// Page layout wrapped around the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
	#[default]
	Default,
	/// Bare layout for XHR responses
	Ajax,
}

pub trait Presenter: Send {
	/// Stage a template variable, replacing any previous value
	fn set(&mut self, name: &str, value: Value);

	/// Select the view to render
	fn render(&mut self, view: &str);

	fn set_view_mode(&mut self, mode: ViewMode);

	fn set_layout(&mut self, layout: Layout);
}

/// Serialize `value` and stage it under `name`
pub fn set_serialized<T>(presenter: &mut dyn Presenter, name: &str, value: &T) -> CrudResult<()>
where
	T: Serialize + ?Sized,
{
	let value = serde_json::to_value(value)
		.map_err(|e| CrudError::Render(format!("cannot serialize '{}': {}", name, e)))?;
	presenter.set(name, value);
	Ok(())
}

/// Presenter that records what an action asked for
///
/// ```
/// use admin_crud_core::presenter::{Presenter, ViewContext, ViewMode};
/// use serde_json::json;
///
/// let mut view = ViewContext::new();
/// view.set("results", json!([]));
/// view.set_view_mode(ViewMode::Json);
/// view.render("type_ahead");
///
/// assert_eq!(view.view(), Some("type_ahead"));
/// assert_eq!(view.get("results"), Some(&json!([])));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewContext {
	variables: IndexMap<String, Value>,
	view: Option<String>,
	view_mode: ViewMode,
	layout: Layout,
}

impl ViewContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.variables.get(name)
	}

	pub fn variables(&self) -> &IndexMap<String, Value> {
		&self.variables
	}

	pub fn view(&self) -> Option<&str> {
		self.view.as_deref()
	}

	pub fn view_mode(&self) -> ViewMode {
		self.view_mode
	}

	pub fn layout(&self) -> Layout {
		self.layout
	}
}

impl Presenter for ViewContext {
	fn set(&mut self, name: &str, value: Value) {
		self.variables.insert(name.to_string(), value);
	}

	fn render(&mut self, view: &str) {
		self.view = Some(view.to_string());
	}

	fn set_view_mode(&mut self, mode: ViewMode) {
		self.view_mode = mode;
	}

	fn set_layout(&mut self, layout: Layout) {
		self.layout = layout;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn records_staged_variables_in_order() {
		// Arrange
		let mut view = ViewContext::new();

		// Act
		set_serialized(&mut view, "typeAhead", &IndexMap::<String, String>::new()).unwrap();
		view.set("result", json!({"id": 1}));
		view.set("result", json!({"id": 2}));

		// Assert
		assert_eq!(
			view.variables().keys().collect::<Vec<_>>(),
			vec!["typeAhead", "result"]
		);
		assert_eq!(view.get("result"), Some(&json!({"id": 2})));
		assert_eq!(view.view_mode(), ViewMode::Html);
		assert_eq!(view.layout(), Layout::Default);
	}

	#[rstest]
	fn serializes_for_host_rendering() {
		// Arrange
		let mut view = ViewContext::new();
		view.set_layout(Layout::Ajax);
		view.render("index");

		// Act
		let value = serde_json::to_value(&view).unwrap();

		// Assert
		assert_eq!(
			value,
			json!({"variables": {}, "view": "index", "viewMode": "html", "layout": "ajax"})
		);
	}
}
