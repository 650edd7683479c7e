//! End-to-end tests of the admin CRUD actions
//!
//! Every test drives the controller against the in-memory store and
//! inspects both the returned outcome and the variables staged on the
//! presenter.

use admin_crud_core::{
	AdminSettings, Association, Condition, CrudError, CrudResult, CrudSettings, FieldDescriptor,
	FieldKind, FindOptions, Layout, MemoryStore, ModelDescriptor, ModelRegistry, Record,
	Repository, RepositoryProvider, RequestPayload, SaveError, SaveOptions, SaveOutcome,
	ViewContext, ViewMode,
};
use admin_crud_server::{CrudController, CrudRequest, FlashClass};
use async_trait::async_trait;
use http::{Method, StatusCode};
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Site {
	store: MemoryStore,
	controller: CrudController,
}

fn fields(value: Value) -> admin_crud_core::Fields {
	serde_json::from_value(value).unwrap()
}

fn payload(value: Value) -> RequestPayload {
	serde_json::from_value(value).unwrap()
}

fn registry(settings: &CrudSettings) -> Arc<ModelRegistry> {
	let admin = AdminSettings::from(settings);
	let registry = Arc::new(ModelRegistry::new());
	let descriptors = [
		ModelDescriptor::builder("Category")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("name", FieldKind::String).required())
			.admin(admin)
			.build(),
		ModelDescriptor::builder("Post")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("title", FieldKind::String).required())
			.field(FieldDescriptor::new("body", FieldKind::Text).nullable())
			.field(FieldDescriptor::new("category_id", FieldKind::Integer).nullable())
			.belongs_to("Category", Association::new("Category", "category_id"))
			.has_many(
				"Comment",
				Association::new("Comment", "post_id").dependent(true),
			)
			.has_and_belongs_to_many(
				"Tag",
				Association::new("Tag", "post_id").through("posts_tags", "tag_id"),
			)
			.admin(admin)
			.build(),
		ModelDescriptor::builder("Comment")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("post_id", FieldKind::Integer))
			.field(FieldDescriptor::new("body", FieldKind::Text).required())
			.display_field("body")
			.belongs_to("Post", Association::new("Post", "post_id"))
			.admin(admin)
			.build(),
		ModelDescriptor::builder("Tag")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("name", FieldKind::String))
			.admin(admin)
			.build(),
		ModelDescriptor::builder("AuditLog")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("message", FieldKind::Text))
			.deletable(false)
			.build(),
		ModelDescriptor::builder("ProductVariant")
			.plugin("Shop")
			.field(FieldDescriptor::new("id", FieldKind::Integer))
			.field(FieldDescriptor::new("name", FieldKind::String))
			.build(),
	];
	for descriptor in descriptors {
		registry.register(descriptor.unwrap()).unwrap();
	}
	registry.validate().unwrap();
	registry
}

#[fixture]
fn site() -> Site {
	let settings = CrudSettings::default();
	let registry = registry(&settings);
	let store = MemoryStore::new(Arc::clone(&registry));
	store
		.insert("Category", fields(json!({"name": "Garden"})))
		.unwrap();
	store
		.insert("Category", fields(json!({"name": "Kitchen"})))
		.unwrap();
	for name in ["rust", "web"] {
		store.insert("Tag", fields(json!({"name": name}))).unwrap();
	}
	let controller = CrudController::new(registry, Arc::new(store.clone()), settings);
	Site { store, controller }
}

fn seed_post(site: &Site, title: &str) -> Value {
	site.store
		.insert(
			"Post",
			fields(json!({"title": title, "body": null, "category_id": 1})),
		)
		.unwrap()
}

/// Repository wrapper counting every storage call
struct CountingRepository {
	inner: Arc<dyn Repository>,
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Repository for CountingRepository {
	fn descriptor(&self) -> Arc<ModelDescriptor> {
		self.inner.descriptor()
	}

	async fn find_first(&self, options: &FindOptions) -> CrudResult<Option<Record>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.find_first(options).await
	}

	async fn find_all(&self, options: &FindOptions) -> CrudResult<Vec<Record>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.find_all(options).await
	}

	async fn count(&self, conditions: &[Condition]) -> CrudResult<u64> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.count(conditions).await
	}

	async fn save_associated(
		&self,
		payload: &RequestPayload,
		options: &SaveOptions,
	) -> Result<SaveOutcome, SaveError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.save_associated(payload, options).await
	}

	async fn delete(&self, id: &Value, cascade: bool) -> CrudResult<bool> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.delete(id, cascade).await
	}
}

struct CountingProvider {
	store: MemoryStore,
	calls: Arc<AtomicUsize>,
}

impl RepositoryProvider for CountingProvider {
	fn repository(&self, class_name: &str) -> CrudResult<Arc<dyn Repository>> {
		Ok(Arc::new(CountingRepository {
			inner: self.store.repository(class_name)?,
			calls: Arc::clone(&self.calls),
		}))
	}
}

// ==================== 1. LIST ====================

#[rstest]
#[tokio::test]
async fn test_index_paginates_with_shallow_containment(site: Site) {
	// Arrange
	for index in 1..=30 {
		seed_post(&site, &format!("Post {}", index));
	}
	let request = CrudRequest::get().with_query("page", "2");
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.index("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("index"));
	let results = view.get("results").unwrap().as_array().unwrap();
	assert_eq!(results.len(), 5);
	assert_eq!(results[0]["id"], json!(26));
	assert_eq!(results[0]["Category"]["name"], json!("Garden"));
	assert_eq!(results[0]["Tag"], json!([]));
	assert!(results[0].get("Comment").is_none());
	assert_eq!(
		view.get("pagination"),
		Some(&json!({"page": 2, "pageSize": 25, "total": 30, "pageCount": 2}))
	);
}

#[rstest]
#[case("0")]
#[case("-3")]
#[case("many")]
#[tokio::test]
async fn test_index_clamps_invalid_page_to_first(site: Site, #[case] page: &str) {
	// Arrange
	seed_post(&site, "Only");
	let request = CrudRequest::get().with_query("page", page);
	let mut view = ViewContext::new();

	// Act
	site.controller.index("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(view.get("pagination").unwrap()["page"], json!(1));
	assert_eq!(view.get("results").unwrap().as_array().unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_batch_delete_removes_every_submitted_id(site: Site) {
	// Arrange
	seed_post(&site, "One");
	seed_post(&site, "Two");
	seed_post(&site, "Three");
	let request = CrudRequest::post(payload(json!({"Post": {"ids": ["1", 3]}})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.index("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some("/admin/post"));
	assert_eq!(
		outcome.flash().map(|f| f.message.as_str()),
		Some("Successfully deleted 2 posts")
	);
	let remaining = site.store.rows("Post");
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0]["title"], json!("Two"));
}

#[rstest]
#[tokio::test]
async fn test_batch_delete_reports_partial_failure(site: Site) {
	// Arrange
	seed_post(&site, "One");
	let request = CrudRequest::post(payload(json!({"Post": {"ids": [1, 42]}})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.index("post", &request, &mut view).await.unwrap();

	// Assert
	let flash = outcome.flash().unwrap();
	assert_eq!(flash.class, FlashClass::Error);
	assert_eq!(flash.message, "Failed to delete 1 of 2 posts");
	assert_eq!(site.store.row_count("Post"), 0);
}

#[rstest]
#[tokio::test]
async fn test_batch_delete_on_non_deletable_model_is_forbidden(site: Site) {
	// Arrange
	site.store
		.insert("AuditLog", fields(json!({"message": "boot"})))
		.unwrap();
	let request = CrudRequest::post(payload(json!({"AuditLog": {"ids": [1]}})));
	let mut view = ViewContext::new();

	// Act
	let result = site.controller.index("audit_log", &request, &mut view).await;

	// Assert
	assert!(matches!(result, Err(CrudError::Forbidden(_))));
	assert_eq!(site.store.row_count("AuditLog"), 1);
}

// ==================== 2. CREATE ====================

#[rstest]
#[tokio::test]
async fn test_create_form_stages_blank_record_and_options(site: Site) {
	// Arrange
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.create("post", &CrudRequest::get(), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("form"));
	assert!(outcome.flash().is_none());
	assert_eq!(
		view.get("data"),
		Some(&json!({"Post": {"id": null, "title": null, "body": null, "category_id": null}}))
	);
	assert_eq!(
		view.get("categories"),
		Some(&json!({"1": "1 - Garden", "2": "2 - Kitchen"}))
	);
	assert_eq!(view.get("typeAhead"), Some(&json!({})));
	assert_eq!(view.get("model").unwrap()["alias"], json!("Post"));
}

#[rstest]
#[case::default_target(None, "/admin/post")]
#[case::read_target(Some("read"), "/admin/post/read/1")]
#[case::unknown_target(Some("publish"), "/admin/post")]
#[tokio::test]
async fn test_create_redirects_after_save(
	site: Site,
	#[case] redirect_to: Option<&str>,
	#[case] location: &str,
) {
	// Arrange
	let mut body = json!({"Post": {"title": "Hello", "category_id": "2"}});
	if let Some(target) = redirect_to {
		body["Post"]["redirect_to"] = json!(target);
	}
	let request = CrudRequest::post(payload(body));
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.create("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some(location));
	let flash = outcome.flash().unwrap();
	assert_eq!(flash.message, "Successfully created a new post");
	assert_eq!(flash.class, FlashClass::Success);
	let rows = site.store.rows("Post");
	assert_eq!(rows.len(), 1);
	assert!(rows[0].get("redirect_to").is_none());
}

#[rstest]
#[tokio::test]
async fn test_explicit_redirect_wins_over_payload(site: Site) {
	// Arrange
	let request = CrudRequest::post(payload(
		json!({"Post": {"title": "Hello", "redirect_to": "read"}}),
	))
	.with_redirect("update");
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.create("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some("/admin/post/update/1"));
}

#[rstest]
#[tokio::test]
async fn test_create_coerces_nulls_before_saving(site: Site) {
	// Arrange
	let request = CrudRequest::post(payload(json!({
		"Post": {
			"title": "Hello",
			"body": "discard me",
			"body_null": "1",
			"category_id": "",
			"category_id_type_ahead": "Gar",
		}
	})));
	let mut view = ViewContext::new();

	// Act
	site.controller.create("post", &request, &mut view).await.unwrap();

	// Assert
	let row = &site.store.rows("Post")[0];
	assert_eq!(row.get("body"), Some(&Value::Null));
	assert!(row.get("body_null").is_none());
	assert!(row.get("category_id_type_ahead").is_none());
}

#[rstest]
#[tokio::test]
async fn test_create_with_invalid_nested_rows_writes_nothing(site: Site) {
	// Arrange
	let request = CrudRequest::post(payload(json!({
		"Post": {"title": "Hello", "body": "x", "body_null": "1"},
		"Comment": [{"body": "fine"}, {"body": ""}],
	})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site.controller.create("post", &request, &mut view).await.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("form"));
	let flash = outcome.flash().unwrap();
	assert_eq!(flash.message, "Failed to create a new post");
	assert_eq!(flash.class, FlashClass::Error);
	assert_eq!(site.store.row_count("Post"), 0);
	assert_eq!(site.store.row_count("Comment"), 0);

	let data = view.get("data").unwrap();
	assert_eq!(data["Post"]["body"], Value::Null);
	assert_eq!(data["Post"]["body_null"], json!("1"));
	assert_eq!(
		view.get("validationErrors").unwrap()["Comment.1"]["body"],
		json!(["This field is required"])
	);
	assert!(view.get("categories").is_some());
}

#[rstest]
#[tokio::test]
async fn test_create_form_switches_to_type_ahead_above_limit() {
	// Arrange
	let settings = CrudSettings {
		association_limit: 1,
		..CrudSettings::default()
	};
	let registry = registry(&settings);
	let store = MemoryStore::new(Arc::clone(&registry));
	for name in ["Garden", "Kitchen"] {
		store.insert("Category", fields(json!({"name": name}))).unwrap();
	}
	let controller = CrudController::new(registry, Arc::new(store), settings);
	let mut view = ViewContext::new();

	// Act
	controller
		.create("post", &CrudRequest::get(), &mut view)
		.await
		.unwrap();

	// Assert
	assert!(view.get("categories").is_none());
	assert_eq!(
		view.get("typeAhead"),
		Some(&json!({
			"category_id": {"foreignKey": "category_id", "alias": "Category", "className": "Category"}
		}))
	);
}

// ==================== 3. READ ====================

#[rstest]
#[tokio::test]
async fn test_read_uses_deep_containment(site: Site) {
	// Arrange
	let id = seed_post(&site, "Hello");
	site.store
		.insert("Comment", fields(json!({"post_id": id, "body": "Nice"})))
		.unwrap();
	site.store
		.link("posts_tags", fields(json!({"post_id": id, "tag_id": 2})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.read("post", "1", &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("read"));
	let result = view.get("result").unwrap();
	assert_eq!(result["Category"]["name"], json!("Garden"));
	assert_eq!(result["Tag"][0]["name"], json!("web"));
	assert_eq!(result["Comment"][0]["body"], json!("Nice"));
	assert_eq!(result["Comment"][0]["Post"]["title"], json!("Hello"));
}

#[rstest]
#[tokio::test]
async fn test_read_missing_record_is_not_found(site: Site) {
	// Arrange
	let mut view = ViewContext::new();

	// Act
	let result = site.controller.read("post", "404", &mut view).await;

	// Assert
	match result {
		Err(CrudError::NotFound { model, id }) => {
			assert_eq!(model, "Post");
			assert_eq!(id, "404");
		}
		other => panic!("Expected NotFound, got {:?}", other),
	}
	assert!(view.view().is_none());
}

// ==================== 4. UPDATE ====================

#[rstest]
#[tokio::test]
async fn test_update_form_stages_stored_record(site: Site) {
	// Arrange
	let id = seed_post(&site, "Hello");
	site.store
		.insert("Comment", fields(json!({"post_id": id, "body": "Nice"})))
		.unwrap();
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.update("post", "1", &CrudRequest::get(), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("form"));
	let data = view.get("data").unwrap();
	assert_eq!(data["Post"]["title"], json!("Hello"));
	assert_eq!(data["Category"]["name"], json!("Garden"));
	assert!(data.get("Comment").is_none());
}

#[rstest]
#[case(Method::POST)]
#[case(Method::PUT)]
#[tokio::test]
async fn test_update_saves_and_redirects(site: Site, #[case] method: Method) {
	// Arrange
	seed_post(&site, "Hello");
	let request = CrudRequest::new(
		method,
		payload(json!({
			"Post": {"title": "Renamed", "redirect_to": "update"},
			"Tag": {"Tag": ["1", "2"]},
		})),
	);
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.update("post", "1", &request, &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some("/admin/post/update/1"));
	assert_eq!(
		outcome.flash().map(|f| f.message.as_str()),
		Some("Successfully updated post with ID 1")
	);
	assert_eq!(site.store.rows("Post")[0]["title"], json!("Renamed"));
	assert_eq!(site.store.join_rows("posts_tags").len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_update_failure_redisplays_submission(site: Site) {
	// Arrange
	seed_post(&site, "Hello");
	let request = CrudRequest::put(payload(json!({"Post": {"title": "", "category_id": 9}})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.update("post", "1", &request, &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("form"));
	assert_eq!(
		outcome.flash().map(|f| f.message.as_str()),
		Some("Failed to update post with ID 1")
	);
	assert_eq!(view.get("data").unwrap()["Post"]["category_id"], json!(9));
	assert_eq!(site.store.rows("Post")[0]["title"], json!("Hello"));
	let errors = view.get("validationErrors").unwrap();
	assert_eq!(errors["Post"]["title"], json!(["This field is required"]));
	assert_eq!(
		errors["Post"]["category_id"],
		json!(["Does not reference an existing Category"])
	);
}

// ==================== 5. DELETE ====================

#[rstest]
#[tokio::test]
async fn test_delete_get_renders_confirmation(site: Site) {
	// Arrange
	seed_post(&site, "Hello");
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.delete("post", "1", &CrudRequest::get(), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("delete"));
	assert_eq!(view.get("result"), Some(&json!({"id": 1, "title": "Hello", "body": null, "category_id": 1})));
	assert_eq!(site.store.row_count("Post"), 1);
}

#[rstest]
#[tokio::test]
async fn test_delete_post_cascades_to_dependents(site: Site) {
	// Arrange
	let id = seed_post(&site, "Hello");
	site.store
		.insert("Comment", fields(json!({"post_id": id, "body": "Nice"})))
		.unwrap();
	site.store
		.link("posts_tags", fields(json!({"post_id": id, "tag_id": 1})));
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.delete("post", "1", &CrudRequest::post(RequestPayload::new()), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some("/admin/post"));
	assert_eq!(
		outcome.flash().map(|f| f.message.as_str()),
		Some("Successfully deleted post with ID 1")
	);
	assert_eq!(site.store.row_count("Post"), 0);
	assert_eq!(site.store.row_count("Comment"), 0);
	assert!(site.store.join_rows("posts_tags").is_empty());
}

#[rstest]
#[tokio::test]
async fn test_delete_storage_failure_rerenders_confirmation(site: Site) {
	// Arrange
	seed_post(&site, "Hello");
	site.store.set_read_only(true);
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.delete("post", "1", &CrudRequest::post(RequestPayload::new()), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("delete"));
	let flash = outcome.flash().unwrap();
	assert_eq!(flash.message, "Failed to delete post with ID 1");
	assert_eq!(flash.class, FlashClass::Error);
	assert_eq!(site.store.row_count("Post"), 1);
}

#[rstest]
#[case(Method::GET)]
#[case(Method::POST)]
#[tokio::test]
async fn test_delete_forbidden_before_any_query(#[case] method: Method) {
	// Arrange
	let settings = CrudSettings::default();
	let registry = registry(&settings);
	let store = MemoryStore::new(Arc::clone(&registry));
	store
		.insert("AuditLog", fields(json!({"message": "boot"})))
		.unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let provider = CountingProvider {
		store: store.clone(),
		calls: Arc::clone(&calls),
	};
	let controller = CrudController::new(registry, Arc::new(provider), settings);
	let request = CrudRequest::new(method, RequestPayload::new());
	let mut view = ViewContext::new();

	// Act
	let result = controller
		.delete("audit_log", "1", &request, &mut view)
		.await;

	// Assert
	assert!(matches!(result, Err(CrudError::Forbidden(_))));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(store.row_count("AuditLog"), 1);
}

// ==================== 6. TYPE-AHEAD ====================

#[rstest]
#[tokio::test]
async fn test_type_ahead_returns_json_labels(site: Site) {
	// Arrange
	let request = CrudRequest::get()
		.with_query_string("query=GAR")
		.unwrap();
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.type_ahead("category", &request, &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("type_ahead"));
	assert_eq!(view.get("results"), Some(&json!({"1": "1 - Garden"})));
	assert_eq!(view.get("_serialize"), Some(&json!("results")));
	assert_eq!(view.view_mode(), ViewMode::Json);
	assert_eq!(view.layout(), Layout::Ajax);
}

#[rstest]
#[case::missing(None)]
#[case::empty(Some(""))]
#[case::whitespace_only(Some("   "))]
#[tokio::test]
async fn test_type_ahead_requires_query(site: Site, #[case] query: Option<&str>) {
	// Arrange
	let mut request = CrudRequest::get();
	if let Some(query) = query {
		request = request.with_query("query", query);
	}
	let mut view = ViewContext::new();

	// Act
	let result = site
		.controller
		.type_ahead("category", &request, &mut view)
		.await;

	// Assert
	assert!(matches!(result, Err(CrudError::BadRequest(_))));
}

#[rstest]
#[tokio::test]
async fn test_zero_max_page_size_still_lists_one_row_per_page() {
	// Arrange
	let settings = CrudSettings {
		max_page_size: 0,
		..CrudSettings::default()
	};
	let registry = registry(&CrudSettings::default());
	let store = MemoryStore::new(Arc::clone(&registry));
	for name in ["Garden", "Gate"] {
		store.insert("Category", fields(json!({"name": name}))).unwrap();
	}
	let controller = CrudController::new(registry, Arc::new(store), settings);
	let mut listing = ViewContext::new();
	let mut search = ViewContext::new();

	// Act
	controller
		.index("category", &CrudRequest::get(), &mut listing)
		.await
		.unwrap();
	controller
		.type_ahead("category", &CrudRequest::get().with_query("query", "ga"), &mut search)
		.await
		.unwrap();

	// Assert
	assert_eq!(listing.get("pagination").unwrap()["pageSize"], json!(1));
	assert_eq!(listing.get("pagination").unwrap()["pageCount"], json!(2));
	assert_eq!(listing.get("results").unwrap().as_array().unwrap().len(), 1);
	assert_eq!(search.get("results").unwrap().as_object().unwrap().len(), 1);
}

// ==================== 7. ROUTING ====================

#[rstest]
#[case("/admin/blog.comment", Method::GET, StatusCode::NOT_FOUND)]
#[case("/admin/post/read/99", Method::GET, StatusCode::NOT_FOUND)]
#[case("/admin/post/read/1", Method::POST, StatusCode::BAD_REQUEST)]
#[case("/admin/post/read", Method::GET, StatusCode::BAD_REQUEST)]
#[case("/admin/post/type_ahead", Method::GET, StatusCode::BAD_REQUEST)]
#[case("/admin/audit_log/delete/1", Method::GET, StatusCode::FORBIDDEN)]
#[tokio::test]
async fn test_handle_maps_errors_to_status(
	site: Site,
	#[case] path: &str,
	#[case] method: Method,
	#[case] status: StatusCode,
) {
	// Arrange
	seed_post(&site, "Hello");
	let request = CrudRequest::new(method, RequestPayload::new());
	let mut view = ViewContext::new();

	// Act
	let result = site.controller.handle(path, &request, &mut view).await;

	// Assert
	assert_eq!(result.unwrap_err().status, status);
}

#[rstest]
#[case("/admin/shop.product_variant")]
#[case("/admin/Shop.ProductVariant/")]
#[tokio::test]
async fn test_handle_resolves_plugin_models(site: Site, #[case] path: &str) {
	// Arrange
	site.store
		.insert("Shop.ProductVariant", fields(json!({"name": "Large"})))
		.unwrap();
	let mut view = ViewContext::new();

	// Act
	let outcome = site
		.controller
		.handle(path, &CrudRequest::get(), &mut view)
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.view(), Some("index"));
	assert_eq!(view.get("results").unwrap()[0]["name"], json!("Large"));
	assert_eq!(view.get("model").unwrap()["urlSlug"], json!("shop.product_variant"));
}
