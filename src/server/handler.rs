// Axum routes: landing page, cached image and the todo API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::page::render_index;
use crate::engine::service::ImageService;
use crate::error::{ApiError, ValidationError};
use crate::todo::model::{NewTodo, Todo};
use crate::todo::store::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub images: Arc<ImageService>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(images: Arc<ImageService>, todos: Arc<dyn TodoStore>) -> Self {
        Self { images, todos }
    }
}

/// `GET /` and `GET /image`.
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/image", get(image_handler))
}

/// `GET /todos` and `POST /todos`.
pub fn todo_routes() -> Router<AppState> {
    Router::new().route("/todos", get(list_todos).post(create_todo))
}

/// Full application router with request logging.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(image_routes())
        .merge(todo_routes())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Handle to a server running on a background task.
pub struct AppServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl AppServer {
    /// Bind `addr` and serve the application on a spawned task.
    pub async fn start(addr: &str, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app(state))
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let resp = next.run(req).await;

    info!(
        "Method: {}, Path: {}, Status: {}, Duration: {:?}",
        method,
        path,
        resp.status().as_u16(),
        start.elapsed()
    );
    resp
}

async fn index_handler() -> Html<String> {
    Html(render_index())
}

/// GET /image: refresh if stale, then send the artifact. Fails closed with 500.
async fn image_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.images.ensure_fresh().await?;
    let image = state.images.load().await?;
    debug!(
        "serving image ({} bytes, {})",
        image.bytes.len(),
        image.content_type
    );
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(new_todo) = payload.map_err(|e| ValidationError::Malformed(e.body_text()))?;
    new_todo.validate()?;

    let todo = state.todos.create(&new_todo.text).await?;
    info!("Created new todo: id={}, text={:?}", todo.id, todo.text);
    Ok((StatusCode::CREATED, Json(todo)))
}
