use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AdminUser,
    categories::{
        dto::{
            AddCategoryRequest, AddCategoryResponse, CategoryListItem, DeleteCategoryResponse,
            FetchCategoriesResponse, NoChangeResponse, SearchCategoriesResponse, SearchQuery,
            UpdateCategoryRequest, UpdateCategoryResponse,
        },
        repo::Category,
        validate,
    },
    error::AppError,
    state::AppState,
};

#[instrument(skip(state, admin, payload), fields(user_id = admin.session.user_id))]
pub async fn add_category(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<AddCategoryRequest>,
) -> Result<(StatusCode, Json<AddCategoryResponse>), AppError> {
    let owner_id = admin.session.user_id;
    let name = payload.category_name.trim().to_string();

    let issues = validate::validate(&state.db, &name, owner_id, None).await?;
    if !issues.is_empty() {
        warn!(name, ?issues, "add category rejected");
        return Err(AppError::Validation(issues));
    }

    let Some(category) = Category::add(&state.db, owner_id, &name).await? else {
        // The validator passed moments ago, so this is the write-time
        // duplicate re-check firing.
        warn!(name, "add category failed at write time");
        return Err(AppError::DuplicateName);
    };

    info!(category_id = category.id, name = %category.name, "category added");
    Ok((
        StatusCode::CREATED,
        Json(AddCategoryResponse {
            status: "success",
            message: "Category added successfully".into(),
            category_id: category.id,
            category_name: category.name,
            created_at: category.created_at,
        }),
    ))
}

#[instrument(skip(state, admin, payload), fields(user_id = admin.session.user_id))]
pub async fn update_category(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(category_id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Response, AppError> {
    let owner_id = admin.session.user_id;
    let name = payload.category_name.trim().to_string();

    let existing = Category::get_by_id(&state.db, category_id, Some(owner_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Category not found or you do not have permission to edit it".into())
        })?;

    let issues = validate::validate(&state.db, &name, owner_id, Some(category_id)).await?;
    if !issues.is_empty() {
        warn!(category_id, name, ?issues, "update category rejected");
        return Err(AppError::Validation(issues));
    }

    if validate::is_no_change(&existing.name, &name) {
        return Ok(Json(NoChangeResponse {
            status: "info",
            message: "No changes detected. Category name remains the same.".into(),
            category_id,
            category_name: name,
        })
        .into_response());
    }

    if !Category::update(&state.db, category_id, owner_id, &name).await? {
        warn!(category_id, name, "update category failed at write time");
        return Err(AppError::DuplicateName);
    }

    info!(category_id, old = %existing.name, new = %name, "category updated");
    Ok(Json(UpdateCategoryResponse {
        status: "success",
        message: "Category updated successfully".into(),
        category_id,
        category_name: name,
        original_name: existing.name,
        updated_at: OffsetDateTime::now_utc(),
    })
    .into_response())
}

#[instrument(skip(state, admin), fields(user_id = admin.session.user_id))]
pub async fn delete_category(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(category_id): Path<i64>,
) -> Result<Json<DeleteCategoryResponse>, AppError> {
    let owner_id = admin.session.user_id;

    let existing = Category::get_by_id(&state.db, category_id, Some(owner_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "Category not found or you do not have permission to delete it".into(),
            )
        })?;

    if !Category::delete(&state.db, category_id, owner_id).await? {
        // Deleted between the lookup and the delete.
        return Err(AppError::NotFound(
            "Category not found or you do not have permission to delete it".into(),
        ));
    }

    info!(category_id, name = %existing.name, "category deleted");
    Ok(Json(DeleteCategoryResponse {
        status: "success",
        message: "Category deleted successfully".into(),
        category_id,
        category_name: existing.name,
    }))
}

#[instrument(skip(state, admin), fields(user_id = admin.session.user_id))]
pub async fn fetch_categories(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<FetchCategoriesResponse>, AppError> {
    let owner_id = admin.session.user_id;

    let rows = Category::list_by_owner(&state.db, owner_id).await?;
    let total_count = Category::count(&state.db, owner_id).await?;

    let categories: Vec<CategoryListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, c)| CategoryListItem::from_row(c, i))
        .collect();

    Ok(Json(FetchCategoriesResponse {
        status: "success",
        message: "Categories fetched successfully".into(),
        count: categories.len(),
        total_count,
        categories,
    }))
}

#[instrument(skip(state, admin), fields(user_id = admin.session.user_id))]
pub async fn search_categories(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchCategoriesResponse>, AppError> {
    let owner_id = admin.session.user_id;
    let term = query.q.trim();

    if term.is_empty() {
        return Err(AppError::BadRequest("Search term is required".into()));
    }

    let rows = Category::search(&state.db, owner_id, term).await?;
    let categories: Vec<CategoryListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, c)| CategoryListItem::from_row(c, i))
        .collect();

    Ok(Json(SearchCategoriesResponse {
        status: "success",
        message: "Categories fetched successfully".into(),
        count: categories.len(),
        categories,
    }))
}
