//! Expense category management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::workflow_error_response};
use outlay_db::entities::expense_categories;
use outlay_db::repositories::category::{
    CategoryRepository, CreateCategoryInput, UpdateCategoryInput,
};
use outlay_shared::types::PageRequest;

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/categories/dropdown", get(dropdown_categories))
        .route("/categories/{category_id}", get(get_category))
        .route("/categories/{category_id}", patch(update_category))
        .route("/categories/{category_id}", delete(delete_category))
        .route(
            "/categories/{category_id}/toggle",
            post(toggle_category_status),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Response for a category.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    /// Category ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Active status.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

fn category_to_response(category: expense_categories::Model) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        description: category.description,
        is_active: category.is_active,
        created_at: category.created_at.to_rfc3339(),
        updated_at: category.updated_at.to_rfc3339(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/categories` - List active categories, paginated.
async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.list(auth.caller().as_ref(), &page).await {
        Ok(result) => {
            let items: Vec<CategoryResponse> =
                result.data.into_iter().map(category_to_response).collect();

            (
                StatusCode::OK,
                Json(json!({ "data": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/categories/dropdown` - Active categories as id/name pairs.
async fn dropdown_categories(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.list_dropdown(auth.caller().as_ref()).await {
        Ok(options) => (StatusCode::OK, Json(json!({ "data": options }))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    let input = CreateCategoryInput {
        name: payload.name,
        description: payload.description,
    };

    match repo.create(auth.caller().as_ref(), input).await {
        Ok(category) => {
            info!(category_id = %category.id, "Category created");
            (StatusCode::CREATED, Json(category_to_response(category))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/categories/{category_id}` - Get a category.
async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.get(auth.caller().as_ref(), category_id).await {
        Ok(category) => (StatusCode::OK, Json(category_to_response(category))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PATCH `/categories/{category_id}` - Update a category.
async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    let input = UpdateCategoryInput {
        name: payload.name,
        description: payload.description,
        is_active: payload.is_active,
    };

    match repo.update(auth.caller().as_ref(), category_id, input).await {
        Ok(category) => {
            info!(category_id = %category_id, "Category updated");
            (StatusCode::OK, Json(category_to_response(category))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// DELETE `/categories/{category_id}` - Soft-delete a category.
async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.delete(auth.caller().as_ref(), category_id).await {
        Ok(category) => {
            info!(category_id = %category_id, "Category deactivated");
            (StatusCode::OK, Json(category_to_response(category))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/categories/{category_id}/toggle` - Flip a category's active flag.
async fn toggle_category_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.toggle_status(auth.caller().as_ref(), category_id).await {
        Ok(category) => {
            info!(
                category_id = %category_id,
                is_active = category.is_active,
                "Category status toggled"
            );
            (StatusCode::OK, Json(category_to_response(category))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}
