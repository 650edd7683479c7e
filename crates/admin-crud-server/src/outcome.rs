//! Action outcomes and flash messages

use serde::Serialize;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashClass {
	Success,
	Error,
}

impl FlashClass {
	pub fn as_str(&self) -> &'static str {
		match self {
			FlashClass::Success => "success",
			FlashClass::Error => "error",
		}
	}
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
	pub message: String,
	pub class: FlashClass,
}

impl FlashMessage {
	pub fn success(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			class: FlashClass::Success,
		}
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			class: FlashClass::Error,
		}
	}

	pub fn is_success(&self) -> bool {
		self.class == FlashClass::Success
	}
}

/// What the host should do once an action returns
///
/// View variables are already staged on the presenter passed to the action.
/// The host stores `flash` in its session (or renders it inline for
/// [`ActionOutcome::Render`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
	/// Render the selected view
	Render {
		view: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		flash: Option<FlashMessage>,
	},
	/// Redirect after a successful mutation
	Redirect {
		location: String,
		flash: FlashMessage,
	},
}

impl ActionOutcome {
	pub fn render(view: impl Into<String>) -> Self {
		ActionOutcome::Render {
			view: view.into(),
			flash: None,
		}
	}

	pub fn render_with_flash(view: impl Into<String>, flash: FlashMessage) -> Self {
		ActionOutcome::Render {
			view: view.into(),
			flash: Some(flash),
		}
	}

	pub fn redirect(location: impl Into<String>, flash: FlashMessage) -> Self {
		ActionOutcome::Redirect {
			location: location.into(),
			flash,
		}
	}

	pub fn flash(&self) -> Option<&FlashMessage> {
		match self {
			ActionOutcome::Render { flash, .. } => flash.as_ref(),
			ActionOutcome::Redirect { flash, .. } => Some(flash),
		}
	}

	/// Redirect location, if this is a redirect
	pub fn location(&self) -> Option<&str> {
		match self {
			ActionOutcome::Redirect { location, .. } => Some(location),
			ActionOutcome::Render { .. } => None,
		}
	}

	/// Rendered view, if this is a render
	pub fn view(&self) -> Option<&str> {
		match self {
			ActionOutcome::Render { view, .. } => Some(view),
			ActionOutcome::Redirect { .. } => None,
		}
	}

	pub fn is_redirect(&self) -> bool {
		matches!(self, ActionOutcome::Redirect { .. })
	}
}
