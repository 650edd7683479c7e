//! CRUD controller actions
//!
//! Each action resolves the route model against the registry, talks to the
//! entity's repository, stages template variables on the presenter and
//! returns an [`ActionOutcome`]. Save failures are recovered here and turned
//! into an error flash plus a re-rendered form; they never escape an action.

use crate::outcome::{ActionOutcome, FlashMessage};
use crate::request::CrudRequest;
use crate::routes::{CrudAction, action_url};
use admin_crud_core::associated::{OptionList, option_label, prepare_associated_data};
use admin_crud_core::containment::{Containment, deep_contain, shallow_contain};
use admin_crud_core::descriptor::ModelDescriptor;
use admin_crud_core::inflector;
use admin_crud_core::presenter::{Layout, Presenter, ViewMode, set_serialized};
use admin_crud_core::record::{Record, value_to_text};
use admin_crud_core::registry::ModelRegistry;
use admin_crud_core::repository::{
	Condition, FindOptions, Repository, RepositoryProvider, SaveOptions, SortDirection,
};
use admin_crud_core::sanitizer::{self, RequestPayload};
use admin_crud_core::settings::CrudSettings;
use admin_crud_core::{CrudError, CrudResult, SaveError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Query parameter of the list page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter of the type-ahead search term
pub const QUERY_PARAM: &str = "query";

/// Field of the model section listing the ids of a batch delete
pub const BATCH_IDS_FIELD: &str = "ids";

/// Pagination block staged for the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: u64,
	pub page_size: u64,
	pub total: u64,
	pub page_count: u64,
}

/// Generic admin controller over every registered model
pub struct CrudController {
	registry: Arc<ModelRegistry>,
	provider: Arc<dyn RepositoryProvider>,
	settings: CrudSettings,
}

impl CrudController {
	pub fn new(
		registry: Arc<ModelRegistry>,
		provider: Arc<dyn RepositoryProvider>,
		settings: CrudSettings,
	) -> Self {
		Self {
			registry,
			provider,
			settings,
		}
	}

	pub fn registry(&self) -> &Arc<ModelRegistry> {
		&self.registry
	}

	pub fn settings(&self) -> &CrudSettings {
		&self.settings
	}

	/// List view; a POST deletes the submitted ids in one go
	pub async fn index(
		&self,
		model: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		tracing::debug!(model = %descriptor.name(), action = "index", method = %request.method, "admin action");

		if request.is_post() {
			return self.batch_delete(&descriptor, &request.payload).await;
		}

		let repository = self.repository(&descriptor)?;
		let page = request
			.query(PAGE_PARAM)
			.and_then(|page| page.trim().parse::<u64>().ok())
			.unwrap_or(1)
			.max(1);
		let page_size = self.settings.page_size(descriptor.admin().paginate_limit);
		let options = FindOptions::new()
			.contain(shallow_contain(&descriptor))
			.order_by(descriptor.primary_key(), SortDirection::Asc)
			.page(page, page_size);

		let results = repository.find_all(&options).await?;
		let total = repository.count(&[]).await?;
		let pagination = Pagination {
			page,
			page_size,
			total,
			page_count: total.div_ceil(page_size),
		};

		set_serialized(presenter, "results", &results)?;
		set_serialized(presenter, "pagination", &pagination)?;
		set_serialized(presenter, "model", &*descriptor)?;
		presenter.render("index");
		Ok(ActionOutcome::render("index"))
	}

	/// Blank form; a POST saves the submitted record with its relations
	pub async fn create(
		&self,
		model: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		tracing::debug!(model = %descriptor.name(), action = "create", method = %request.method, "admin action");
		let repository = self.repository(&descriptor)?;
		let singular = singular_name(&descriptor);

		let mut flash = None;
		let data = if request.is_post() {
			let (submitted, clean) = sanitize(&request.payload);
			match repository
				.save_associated(&clean, &SaveOptions::create())
				.await
			{
				Ok(outcome) => {
					tracing::info!(model = %descriptor.name(), id = %value_to_text(&outcome.id), "created record");
					let flash =
						FlashMessage::success(format!("Successfully created a new {}", singular));
					return Ok(self.redirect(&descriptor, request, Some(&outcome.id), flash));
				}
				Err(err) => {
					tracing::warn!(model = %descriptor.name(), error = %err, "create failed");
					stage_save_failure(presenter, &err)?;
					flash = Some(FlashMessage::error(format!(
						"Failed to create a new {}",
						singular
					)));
					to_value(&submitted)?
				}
			}
		} else {
			form_data(&repository.create())?
		};

		self.render_form(&descriptor, presenter, data, flash).await
	}

	/// Single record with its children and their parents
	pub async fn read(
		&self,
		model: &str,
		id: &str,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		tracing::debug!(model = %descriptor.name(), action = "read", id, "admin action");
		let repository = self.repository(&descriptor)?;

		let contain = deep_contain(&descriptor, &self.registry)?;
		let record = find_record(repository.as_ref(), &descriptor, id, contain).await?;

		set_serialized(presenter, "result", &record)?;
		set_serialized(presenter, "model", &*descriptor)?;
		presenter.render("read");
		Ok(ActionOutcome::render("read"))
	}

	/// Edit form; a POST or PUT saves the submitted changes
	pub async fn update(
		&self,
		model: &str,
		id: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		tracing::debug!(model = %descriptor.name(), action = "update", id, method = %request.method, "admin action");
		let repository = self.repository(&descriptor)?;
		let singular = singular_name(&descriptor);

		let record = find_record(
			repository.as_ref(),
			&descriptor,
			id,
			shallow_contain(&descriptor),
		)
		.await?;
		let key = primary_key_of(&record, &descriptor, id);

		let mut flash = None;
		let data = if request.is_submission() {
			let (submitted, clean) = sanitize(&request.payload);
			match repository
				.save_associated(&clean, &SaveOptions::update(key.clone()))
				.await
			{
				Ok(_) => {
					tracing::info!(model = %descriptor.name(), id = %value_to_text(&key), "updated record");
					let flash = FlashMessage::success(format!(
						"Successfully updated {} with ID {}",
						singular,
						value_to_text(&key)
					));
					return Ok(self.redirect(&descriptor, request, Some(&key), flash));
				}
				Err(err) => {
					tracing::warn!(model = %descriptor.name(), id = %value_to_text(&key), error = %err, "update failed");
					stage_save_failure(presenter, &err)?;
					flash = Some(FlashMessage::error(format!(
						"Failed to update {} with ID {}",
						singular,
						value_to_text(&key)
					)));
					to_value(&submitted)?
				}
			}
		} else {
			form_data(&record)?
		};

		set_serialized(presenter, "result", &record)?;
		self.render_form(&descriptor, presenter, data, flash).await
	}

	/// Confirmation page; a POST deletes the record and its dependents
	///
	/// # Errors
	///
	/// Returns [`CrudError::Forbidden`] for non-deletable models before the
	/// repository is queried.
	pub async fn delete(
		&self,
		model: &str,
		id: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		tracing::debug!(model = %descriptor.name(), action = "delete", id, method = %request.method, "admin action");
		ensure_deletable(&descriptor)?;
		let repository = self.repository(&descriptor)?;
		let singular = singular_name(&descriptor);

		let record = find_record(repository.as_ref(), &descriptor, id, Containment::none()).await?;
		let key = primary_key_of(&record, &descriptor, id);

		let mut flash = None;
		if request.is_post() {
			match repository.delete(&key, true).await {
				Ok(true) => {
					tracing::info!(model = %descriptor.name(), id = %value_to_text(&key), "deleted record");
					let flash = FlashMessage::success(format!(
						"Successfully deleted {} with ID {}",
						singular,
						value_to_text(&key)
					));
					return Ok(self.redirect(&descriptor, request, Some(&key), flash));
				}
				Ok(false) => {
					tracing::warn!(model = %descriptor.name(), id = %value_to_text(&key), "delete removed no rows");
				}
				Err(err) => {
					tracing::warn!(model = %descriptor.name(), id = %value_to_text(&key), error = %err, "delete failed");
				}
			}
			flash = Some(FlashMessage::error(format!(
				"Failed to delete {} with ID {}",
				singular,
				value_to_text(&key)
			)));
		}

		set_serialized(presenter, "result", &record)?;
		set_serialized(presenter, "model", &*descriptor)?;
		presenter.render("delete");
		Ok(match flash {
			Some(flash) => ActionOutcome::render_with_flash("delete", flash),
			None => ActionOutcome::render("delete"),
		})
	}

	/// JSON id → label map of records whose display field contains `query`
	pub async fn type_ahead(
		&self,
		model: &str,
		request: &CrudRequest,
		presenter: &mut dyn Presenter,
	) -> CrudResult<ActionOutcome> {
		let descriptor = self.registry.resolve(model)?;
		let term = request
			.query(QUERY_PARAM)
			.map(str::trim)
			.filter(|term| !term.is_empty())
			.ok_or_else(|| {
				CrudError::BadRequest(format!(
					"type-ahead needs a non-empty '{}' parameter",
					QUERY_PARAM
				))
			})?;
		tracing::debug!(model = %descriptor.name(), action = "type_ahead", term, "admin action");
		let repository = self.repository(&descriptor)?;

		let display = descriptor.display_field();
		let pk = descriptor.primary_key();
		let options = FindOptions::new()
			.condition(Condition::contains(display, term))
			.order_by(display, SortDirection::Asc)
			.limit(self.settings.page_size(u64::MAX));
		let results: OptionList = repository
			.find_all(&options)
			.await?
			.iter()
			.map(|row| {
				let id = row.get(pk).unwrap_or(&Value::Null);
				let label = row.get(display).unwrap_or(&Value::Null);
				(value_to_text(id), option_label(id, label))
			})
			.collect();

		set_serialized(presenter, "results", &results)?;
		presenter.set("_serialize", Value::from("results"));
		presenter.set_view_mode(ViewMode::Json);
		presenter.set_layout(Layout::Ajax);
		presenter.render("type_ahead");
		Ok(ActionOutcome::render("type_ahead"))
	}

	async fn batch_delete(
		&self,
		descriptor: &ModelDescriptor,
		payload: &RequestPayload,
	) -> CrudResult<ActionOutcome> {
		ensure_deletable(descriptor)?;
		let plural = inflector::pluralize(&singular_name(descriptor));
		let ids = batch_ids(payload, descriptor.alias());
		if ids.is_empty() {
			return Err(CrudError::BadRequest(format!(
				"no {} selected for deletion",
				plural
			)));
		}

		let repository = self.repository(descriptor)?;
		let mut deleted = 0;
		for id in &ids {
			match repository.delete(id, true).await {
				Ok(true) => deleted += 1,
				Ok(false) => {
					tracing::warn!(model = %descriptor.name(), id = %value_to_text(id), "batch delete found no record");
				}
				Err(err) => {
					tracing::warn!(model = %descriptor.name(), id = %value_to_text(id), error = %err, "batch delete failed");
				}
			}
		}

		let flash = if deleted == ids.len() {
			tracing::info!(model = %descriptor.name(), deleted, "batch deleted records");
			FlashMessage::success(format!("Successfully deleted {} {}", deleted, plural))
		} else {
			FlashMessage::error(format!(
				"Failed to delete {} of {} {}",
				ids.len() - deleted,
				ids.len(),
				plural
			))
		};
		let location = action_url(
			&self.settings.url_prefix,
			descriptor,
			CrudAction::Index,
			None,
		);
		Ok(ActionOutcome::redirect(location, flash))
	}

	async fn render_form(
		&self,
		descriptor: &ModelDescriptor,
		presenter: &mut dyn Presenter,
		data: Value,
		flash: Option<FlashMessage>,
	) -> CrudResult<ActionOutcome> {
		let associated = prepare_associated_data(descriptor, self.provider.as_ref()).await?;
		associated.apply_to(presenter)?;
		presenter.set("data", data);
		set_serialized(presenter, "model", descriptor)?;
		presenter.render("form");
		Ok(match flash {
			Some(flash) => ActionOutcome::render_with_flash("form", flash),
			None => ActionOutcome::render("form"),
		})
	}

	fn repository(&self, descriptor: &ModelDescriptor) -> CrudResult<Arc<dyn Repository>> {
		self.provider.repository(&descriptor.name())
	}

	/// Redirect to the explicit target, else the payload's `redirect_to`,
	/// else the list view
	fn redirect(
		&self,
		descriptor: &ModelDescriptor,
		request: &CrudRequest,
		id: Option<&Value>,
		flash: FlashMessage,
	) -> ActionOutcome {
		let target = request
			.redirect
			.clone()
			.or_else(|| sanitizer::redirect_target(&request.payload, descriptor.alias()));
		let action = match target {
			Some(target) => target.parse::<CrudAction>().unwrap_or_else(|_| {
				tracing::warn!(model = %descriptor.name(), target = %target, "unknown redirect target, using index");
				CrudAction::Index
			}),
			None => CrudAction::Index,
		};
		let location = action_url(&self.settings.url_prefix, descriptor, action, id);
		ActionOutcome::redirect(location, flash)
	}
}

fn ensure_deletable(descriptor: &ModelDescriptor) -> CrudResult<()> {
	if descriptor.admin().deletable {
		return Ok(());
	}
	tracing::warn!(model = %descriptor.name(), "delete attempted on a non-deletable model");
	Err(CrudError::Forbidden(format!(
		"{} records cannot be deleted",
		descriptor.name()
	)))
}

fn singular_name(descriptor: &ModelDescriptor) -> String {
	descriptor.singular_name().to_lowercase()
}

/// Null-coerced submission for redisplay, and its stripped copy for storage
fn sanitize(payload: &RequestPayload) -> (RequestPayload, RequestPayload) {
	let mut submitted = payload.clone();
	sanitizer::coerce_nulls(&mut submitted);
	let clean = sanitizer::stripped(&submitted);
	(submitted, clean)
}

async fn find_record(
	repository: &dyn Repository,
	descriptor: &ModelDescriptor,
	id: &str,
	contain: Containment,
) -> CrudResult<Record> {
	let key = Value::String(id.to_string());
	repository
		.find_first(&FindOptions::by_primary_key(descriptor, &key).contain(contain))
		.await?
		.ok_or_else(|| CrudError::NotFound {
			model: descriptor.alias().to_string(),
			id: id.to_string(),
		})
}

/// Stored primary key of `record`, falling back to the route id
fn primary_key_of(record: &Record, descriptor: &ModelDescriptor, id: &str) -> Value {
	record
		.get(descriptor.primary_key())
		.cloned()
		.unwrap_or_else(|| Value::String(id.to_string()))
}

fn batch_ids(payload: &RequestPayload, alias: &str) -> Vec<Value> {
	let submitted = match payload.field(alias, BATCH_IDS_FIELD) {
		Some(Value::Array(items)) => items.clone(),
		Some(value) => vec![value.clone()],
		None => Vec::new(),
	};
	submitted
		.into_iter()
		.filter(|id| !value_to_text(id).trim().is_empty())
		.collect()
}

fn stage_save_failure(presenter: &mut dyn Presenter, err: &SaveError) -> CrudResult<()> {
	if let Some(errors) = err.validation_errors() {
		set_serialized(presenter, "validationErrors", errors)?;
	}
	Ok(())
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> CrudResult<Value> {
	serde_json::to_value(value).map_err(|e| CrudError::Render(e.to_string()))
}

/// Form payload of a stored record: `{Alias: fields, Relation: related, ...}`
fn form_data(record: &Record) -> CrudResult<Value> {
	let mut sections = Map::new();
	sections.insert(record.alias().to_string(), to_value(record.fields())?);
	for alias in record.related_aliases() {
		if let Some(related) = record.related(alias) {
			sections.insert(alias.to_string(), to_value(related)?);
		}
	}
	Ok(Value::Object(sections))
}
