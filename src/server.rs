use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::{NewTask, Task, TaskPatch};
use crate::service::TaskService;

type ServiceState = Arc<TaskService>;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

pub fn router(service: Arc<TaskService>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(replace_task).delete(delete_task))
        .route("/tasks/{id}/complete", put(complete_task))
        .with_state(service)
}

/// Bind `addr` and serve the task API until the process is stopped.
pub async fn serve(service: Arc<TaskService>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await
}

/// Run a blocking store operation off the async workers.
async fn run<T, F>(service: ServiceState, op: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&TaskService) -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&service)).await?
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::Validation(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

async fn banner() -> &'static str {
    "ontrack task service"
}

// ---------------------------------------------------------------------------
// GET /tasks
// ---------------------------------------------------------------------------

async fn list_tasks(
    State(service): State<ServiceState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ServiceError> {
    // An empty category means no filter
    let category = query.category.filter(|c| !c.is_empty());
    tracing::debug!(category = ?category, "list tasks");
    let tasks = run(service, move |svc| svc.list(category.as_deref())).await?;
    Ok(Json(tasks))
}

// ---------------------------------------------------------------------------
// POST /tasks
// ---------------------------------------------------------------------------

async fn create_task(
    State(service): State<ServiceState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ServiceError> {
    let input = body(payload)?;
    tracing::debug!("create task");
    let task = run(service, move |svc| svc.create(input)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

// ---------------------------------------------------------------------------
// GET /tasks/:id
// ---------------------------------------------------------------------------

async fn get_task(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ServiceError> {
    let task = run(service, move |svc| svc.get(&id)).await?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// PUT /tasks/:id
// ---------------------------------------------------------------------------

async fn replace_task(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ServiceError> {
    let patch = body(payload)?;
    tracing::debug!(%id, "replace task");
    let task = run(service, move |svc| svc.replace(&id, patch)).await?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// PUT /tasks/:id/complete
// ---------------------------------------------------------------------------

async fn complete_task(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ServiceError> {
    tracing::debug!(%id, "complete task");
    let task = run(service, move |svc| svc.complete(&id)).await?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/:id
// ---------------------------------------------------------------------------

async fn delete_task(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ServiceError> {
    tracing::debug!(%id, "delete task");
    let task = run(service, move |svc| svc.delete(&id)).await?;
    Ok(Json(task))
}
