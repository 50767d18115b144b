//! Site server with on-demand article rendering
//!
//! Precomputed files are served from the public directory. Article pages
//! that were not generated at build time are rendered on the first request,
//! written next to the precomputed ones and served from then on.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::client::ContentSource;
use crate::content::normalize_page;
use crate::error::FetchError;
use crate::generator::{Generator, RenderMode, POSTS_API_PATH};
use crate::helpers;
use crate::templates::PostSummaryData;
use crate::Blog;

/// Rendering state of an article page that was not precomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Never requested, or the last attempt failed
    Missing,
    /// A request is currently rendering it
    Pending,
    /// Rendered and cached
    Ready,
}

enum Unresolved {
    NotFound,
    Failed(anyhow::Error),
}

/// Registry of on-demand article pages.
///
/// Concurrent requests for the same uid share a single render.
#[derive(Default)]
pub struct OnDemandPages {
    cells: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl OnDemandPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, uid: &str) -> PageStatus {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        match cells.get(uid) {
            None => PageStatus::Missing,
            Some(cell) if cell.initialized() => PageStatus::Ready,
            Some(_) => PageStatus::Pending,
        }
    }

    /// Resolve a page, running `render` unless another request already is.
    ///
    /// `render` yields `None` when the article does not exist. Neither a
    /// missing article nor a failure is cached, so the next request retries.
    pub async fn resolve<F, Fut>(&self, uid: &str, render: F) -> Result<Option<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<String>>>,
    {
        let cell = self.cell(uid);

        let outcome = cell
            .get_or_try_init(|| async {
                match render().await {
                    Ok(Some(html)) => Ok(html),
                    Ok(None) => Err(Unresolved::NotFound),
                    Err(e) => Err(Unresolved::Failed(e)),
                }
            })
            .await;

        match outcome {
            Ok(html) => Ok(Some(html.clone())),
            Err(unresolved) => {
                self.forget(uid, &cell);
                match unresolved {
                    Unresolved::NotFound => Ok(None),
                    Unresolved::Failed(e) => Err(e),
                }
            }
        }
    }

    fn cell(&self, uid: &str) -> Arc<OnceCell<String>> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn forget(&self, uid: &str, cell: &Arc<OnceCell<String>>) {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = cells.get(uid) {
            if Arc::ptr_eq(current, cell) && !current.initialized() {
                cells.remove(uid);
            }
        }
    }
}

/// Server state
pub struct ServerState {
    generator: Generator,
    pages: OnDemandPages,
}

impl ServerState {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            pages: OnDemandPages::new(),
        }
    }

    pub fn pages(&self) -> &OnDemandPages {
        &self.pages
    }
}

/// Build the router: article pages, the load-more API and static files
pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.generator.blog().public_dir.clone();
    let api_route = format!("/{}", POSTS_API_PATH);

    Router::new()
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .route(&api_route, get(posts_api_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(
    blog: &Blog,
    source: Arc<dyn ContentSource>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let generator = Generator::new(blog, source)?;
    generator.write_assets()?;

    let state = Arc::new(ServerState::new(generator));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve an article page, rendering it on demand if it was not precomputed
async fn post_handler(State(state): State<Arc<ServerState>>, Path(uid): Path<String>) -> Response {
    // listed uids are slugs, anything else can't name an article
    if !helpers::is_slug(&uid) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let file = state
        .generator
        .output_path(&format!("{}index.html", helpers::post_path(&uid)));
    if let Ok(html) = tokio::fs::read_to_string(&file).await {
        return Html(html).into_response();
    }

    let generator = &state.generator;
    let rendered = state
        .pages
        .resolve(&uid, || generator.generate_article(&uid, RenderMode::OnDemand))
        .await;

    match rendered {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to render post {}: {:#}", uid, e);
            (StatusCode::BAD_GATEWAY, "Failed to render post").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// Load-more payload
#[derive(Debug, Serialize)]
struct PostsResponse {
    posts: Vec<PostSummaryData>,
    next_page: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Return the listing page behind a `next_page` token as JSON
async fn posts_api_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(token) = query.page.filter(|t| !t.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing page token");
    };

    let raw = match state.generator.source().fetch_page(&token).await {
        Ok(raw) => raw,
        Err(e @ FetchError::InvalidToken(_)) => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(e) => {
            tracing::warn!("Failed to fetch listing page: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, "failed to fetch page");
        }
    };

    match normalize_page(raw) {
        Ok(page) => Json(PostsResponse {
            posts: state.generator.summaries(&page),
            next_page: page.next_page,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Malformed listing page: {}", e);
            error_response(StatusCode::BAD_GATEWAY, "malformed page")
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
