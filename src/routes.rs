use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::controller::SyncController;
use crate::document::{ArticleControl, Document, HeadlessDocument, Modal};
use crate::export::NoClipboard;
use crate::feeds::FeedEntry;
use crate::filter::{slugify, ALL_CATEGORIES};
use crate::page::CategoryCount;
use crate::render::{ControlBar, Counters};
use crate::store::SqliteStore;
use crate::validate::FeedForm;

pub type HostController = SyncController<SqliteStore, HeadlessDocument, NoClipboard>;

pub struct AppState {
    pub controller: Mutex<HostController>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/sources", post(add_source))
        .route("/sources/export", post(export_sources))
        .route("/sources/:id/toggle", post(toggle_source))
        .route("/sources/:id/remove", post(remove_source))
        .route("/articles/delete", post(delete_article))
        .route("/articles/restore", post(restore_article))
        .route("/articles/clear", post(clear_articles))
        .route("/articles/save", post(save_article))
        .route("/filter", post(select_category))
        .route("/modal/:name", post(open_modal))
        .route("/close-modal", post(close_modal))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub control_bar: Option<ControlBar>,
    pub counters: Counters,
    pub chips: Vec<ChipView>,
    pub all_active: bool,
    pub total: usize,
    pub items: Vec<ItemView>,
    pub modal: &'static str,
    pub feeds: Vec<FeedEntry>,
    pub deleted: Vec<String>,
    pub listing: String,
    pub notices: Vec<String>,
}

pub struct ChipView {
    pub chip: CategoryCount,
    pub active: bool,
}

pub struct ItemView {
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub category: String,
    pub slug: String,
    pub class: &'static str,
    pub style: String,
    pub star: &'static str,
    pub controls: Vec<(&'static str, &'static str)>,
}

impl IndexTemplate {
    fn from_document(doc: &HeadlessDocument, notices: Vec<String>) -> Self {
        let active = doc.active_chip();
        let chips = doc
            .source()
            .category_counts()
            .into_iter()
            .map(|chip| ChipView {
                active: chip.slug == active,
                chip,
            })
            .collect();

        let items = doc
            .items()
            .iter()
            .map(|item| ItemView {
                id: item.article.id.clone(),
                title: item.article.title.clone(),
                link: item.article.link.clone(),
                source: item.article.source.clone(),
                category: item.article.category.clone(),
                slug: slugify(&item.article.category),
                class: item.class_attr(),
                style: item.style_attr(),
                star: item.star(),
                controls: item
                    .controls
                    .iter()
                    .map(|control| (control.label(), control_action(*control)))
                    .collect(),
            })
            .collect();

        Self {
            title: doc.source().title.clone(),
            control_bar: doc.control_bar().cloned(),
            counters: doc.counters(),
            chips,
            all_active: active == ALL_CATEGORIES,
            total: doc.source().articles.len(),
            items,
            modal: doc.active_modal().map(|m| m.slug()).unwrap_or(""),
            feeds: doc.feed_rows().to_vec(),
            deleted: doc.deleted_rows().to_vec(),
            listing: doc.listing().unwrap_or_default().to_string(),
            notices,
        }
    }
}

fn control_action(control: ArticleControl) -> &'static str {
    match control {
        ArticleControl::Remove => "/articles/delete",
        ArticleControl::Restore => "/articles/restore",
    }
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Failures specific to the host routes.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown dialog '{0}'")]
    UnknownModal(String),
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<HostError>() {
            Some(HostError::UnknownModal(_)) => StatusCode::NOT_FOUND,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, format!("Error: {}", self.0)).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

// Form payloads
#[derive(Deserialize)]
pub struct ArticleForm {
    pub url: String,
}

#[derive(Deserialize)]
pub struct SaveForm {
    pub id: String,
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub category: String,
}

fn back_to_page() -> Redirect {
    Redirect::to("/")
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    let notices = controller.document_mut().take_notices();
    HtmlTemplate(IndexTemplate::from_document(controller.document(), notices))
}

pub async fn add_source(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FeedForm>,
) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    // Rejections are already shown as a notice on the page
    let _ = controller.submit_feed(&form).await;
    back_to_page()
}

pub async fn toggle_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.controller.lock().await.toggle_feed(id).await;
    back_to_page()
}

pub async fn remove_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.controller.lock().await.remove_feed(id).await;
    back_to_page()
}

pub async fn export_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.controller.lock().await.export_feeds().await;
    back_to_page()
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ArticleForm>,
) -> impl IntoResponse {
    state.controller.lock().await.delete_article(&form.url).await;
    back_to_page()
}

pub async fn restore_article(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ArticleForm>,
) -> impl IntoResponse {
    state.controller.lock().await.restore_article(&form.url).await;
    back_to_page()
}

pub async fn clear_articles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.controller.lock().await.clear_deleted().await;
    back_to_page()
}

pub async fn save_article(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SaveForm>,
) -> impl IntoResponse {
    state.controller.lock().await.toggle_saved(&form.id).await;
    back_to_page()
}

pub async fn select_category(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FilterForm>,
) -> impl IntoResponse {
    state
        .controller
        .lock()
        .await
        .select_category(&form.category)
        .await;
    back_to_page()
}

pub async fn open_modal(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let modal = Modal::from_slug(&name).ok_or_else(|| HostError::UnknownModal(name.clone()))?;
    state.controller.lock().await.open_modal(modal);
    Ok(back_to_page())
}

pub async fn close_modal(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.controller.lock().await.close_modal();
    back_to_page()
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
