use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use garde::Validate;
use todo_api::v1::{PagedResult, Todo, TodoDraft};
use tracing::{debug, info};

use crate::{
    error::ApiError,
    pagination::{PageQuery, Pagination},
    store::{NewTodo, Order},
    AppState,
};

pub const BASE_PATH: &str = "/api/Todo";

type Created = (StatusCode, [(HeaderName, String); 1], Json<Todo>);

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_todos).post(add_todo))
        .route("/:id", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/:id/duplicate", post(duplicate_todo))
}

async fn get_todos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Todo>>, ApiError> {
    let pagination = Pagination::from(query);
    let page = state
        .store
        .list_ordered(Order::default())
        .paginate(pagination)
        .await?;

    debug!(
        page = page.current_page,
        page_size = page.page_size,
        total = page.total,
        "listed todos"
    );

    Ok(Json(page))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state.store.find_by_id(id).await?;
    todo.map(Json).ok_or(ApiError::NotFound)
}

async fn add_todo(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TodoDraft>,
) -> Result<Created, ApiError> {
    draft.validate()?;

    let todo = state
        .store
        .create(NewTodo {
            done: draft.is_done(),
            subject: draft.subject,
            description: draft.description,
            created_at: Utc::now(),
        })
        .await?;

    info!(
        id = %todo.id,
        subject = %todo.subject,
        "created todo"
    );

    Ok(created(todo))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(draft): Json<TodoDraft>,
) -> Result<Json<Todo>, ApiError> {
    draft.validate()?;

    let mut todo = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    todo.done = draft.is_done();
    todo.subject = draft.subject;
    todo.description = draft.description;
    todo.updated_at = later_than(todo.updated_at);

    let todo = state.store.update(&todo).await?.ok_or(ApiError::NotFound)?;

    info!(
        id = %todo.id,
        subject = %todo.subject,
        done = todo.done,
        "updated todo"
    );

    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    info!(id = %id, "deleted todo");

    Ok(StatusCode::NO_CONTENT)
}

async fn duplicate_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Created, ApiError> {
    let source = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    let todo = state
        .store
        .create(NewTodo {
            subject: source.subject,
            description: source.description,
            done: source.done,
            created_at: Utc::now().max(source.created_at),
        })
        .await?;

    info!(
        id = %todo.id,
        source = %source.id,
        "duplicated todo"
    );

    Ok(created(todo))
}

fn created(todo: Todo) -> Created {
    let location = format!("{}/{}", BASE_PATH, todo.id);
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(todo),
    )
}

/// The current time, nudged forward if the clock has not moved past
/// `previous`.
fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + Duration::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_than_past_is_now() {
        let past = Utc::now() - Duration::hours(1);
        let next = later_than(past);
        assert!(next > past + Duration::minutes(59));
    }

    #[test]
    fn later_than_future_is_strictly_after() {
        let future = Utc::now() + Duration::hours(1);
        assert!(later_than(future) > future);
    }
}
