use crate::db::task_repository::TaskRepository;
use crate::db::StoreError;
use crate::models::task::{Task, TaskStatus};
use crate::models::user::Claims;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Task not found" }))
}

fn store_failure(e: StoreError, user_id: &str) -> HttpResponse {
    error!(error = %e, user_id = %user_id, "Task store operation failed");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Internal Server Error"
    }))
}

/// List the caller's tasks, newest first
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "The caller's tasks", body = [Task]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn list_tasks(
    claims: web::ReqData<Claims>,
    task_repo: web::Data<TaskRepository>,
) -> impl Responder {
    match task_repo.list_for_owner(&claims.sub).await {
        Ok(tasks) => HttpResponse::Ok().json(tasks),
        Err(e) => store_failure(e, &claims.sub),
    }
}

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn create_task(
    claims: web::ReqData<Claims>,
    task_repo: web::Data<TaskRepository>,
    payload: web::Json<CreateTaskRequest>,
) -> impl Responder {
    if payload.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title is required"
        }));
    }

    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: claims.sub.clone(),
        title: payload.title.clone(),
        description: payload.description.clone(),
        status: payload.status.unwrap_or_default(),
        created_at: chrono::Utc::now(),
    };

    match task_repo.create(task).await {
        Ok(task) => {
            info!(user_id = %claims.sub, task_id = %task.id, "Task created");
            HttpResponse::Created().json(task)
        }
        Err(e) => store_failure(e, &claims.sub),
    }
}

/// Patch a task the caller owns
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    request_body = UpdateTaskRequest,
    params(
        ("id" = String, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task absent or owned by someone else")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn update_task(
    claims: web::ReqData<Claims>,
    task_repo: web::Data<TaskRepository>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> impl Responder {
    let task_id = path.into_inner();

    // Ownership-scoped existence check before any mutation
    let mut task = match task_repo.get_owned(&task_id, &claims.sub).await {
        Ok(Some(task)) => task,
        Ok(None) => return not_found(),
        Err(e) => return store_failure(e, &claims.sub),
    };

    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Title is required"
            }));
        }
        task.title = title.clone();
    }
    if let Some(description) = &payload.description {
        task.description = Some(description.clone());
    }
    if let Some(status) = payload.status {
        task.status = status;
    }

    match task_repo.update(task).await {
        Ok(task) => {
            info!(user_id = %claims.sub, task_id = %task.id, "Task updated");
            HttpResponse::Ok().json(task)
        }
        Err(StoreError::NotFound) => not_found(),
        Err(e) => store_failure(e, &claims.sub),
    }
}

/// Delete a task the caller owns
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task absent or owned by someone else")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn delete_task(
    claims: web::ReqData<Claims>,
    task_repo: web::Data<TaskRepository>,
    path: web::Path<String>,
) -> impl Responder {
    let task_id = path.into_inner();

    match task_repo.delete_owned(&task_id, &claims.sub).await {
        Ok(true) => {
            info!(user_id = %claims.sub, task_id = %task_id, "Task deleted");
            HttpResponse::Ok().json(serde_json::json!({ "message": "Task deleted" }))
        }
        Ok(false) => not_found(),
        Err(e) => store_failure(e, &claims.sub),
    }
}
