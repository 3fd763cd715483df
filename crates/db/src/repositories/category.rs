//! Expense category repository.
//!
//! Categories are admin-managed reference data. Reads are open to staff
//! and admins; every mutation requires the admin role. Deletion is a soft
//! delete that clears `is_active` so historical expenses keep their link.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use outlay_core::expense::{
    require_admin_access, require_expense_access, validation, Caller, WorkflowError,
};
use outlay_shared::types::{PageRequest, PageResponse};

use crate::entities::expense_categories;

use super::{db_err, is_unique_violation};

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name, unique across all categories.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update for a category. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Minimal category projection for selection lists.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CategoryOption {
    /// Category id.
    pub id: Uuid,
    /// Category name.
    pub name: String,
}

/// Repository for expense categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The name is empty or already in use
    /// - Database operation fails
    pub async fn create(
        &self,
        caller: Option<&Caller>,
        input: CreateCategoryInput,
    ) -> Result<expense_categories::Model, WorkflowError> {
        require_admin_access(caller)?;
        validation::validate_category_name(&input.name)?;

        let now = Utc::now().into();
        let active = expense_categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique index on name is the arbiter under concurrency.
        active.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                WorkflowError::DuplicateCategoryName(input.name.trim().to_string())
            } else {
                db_err(e)
            }
        })
    }

    /// Updates a category. Unset input fields are left unchanged.
    ///
    /// Renaming to the category's own current name is allowed; renaming to
    /// another category's name is a conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The category is not found
    /// - The new name is empty or taken by another category
    /// - Database operation fails
    pub async fn update(
        &self,
        caller: Option<&Caller>,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<expense_categories::Model, WorkflowError> {
        require_admin_access(caller)?;

        let category = expense_categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::CategoryNotFound(category_id))?;

        let mut active: expense_categories::ActiveModel = category.into();

        let mut new_name = None;
        if let Some(name) = input.name {
            validation::validate_category_name(&name)?;
            let trimmed = name.trim().to_string();
            active.name = Set(trimmed.clone());
            new_name = Some(trimmed);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                WorkflowError::DuplicateCategoryName(new_name.unwrap_or_default())
            } else {
                db_err(e)
            }
        })
    }

    /// Soft-deletes a category by clearing `is_active`.
    ///
    /// Expenses that reference the category keep their link; the category
    /// simply stops appearing in active listings and selection lists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The category is not found
    /// - Database operation fails
    pub async fn delete(
        &self,
        caller: Option<&Caller>,
        category_id: Uuid,
    ) -> Result<expense_categories::Model, WorkflowError> {
        require_admin_access(caller)?;

        let category = expense_categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::CategoryNotFound(category_id))?;

        let mut active: expense_categories::ActiveModel = category.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Flips a category between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The category is not found
    /// - Database operation fails
    pub async fn toggle_status(
        &self,
        caller: Option<&Caller>,
        category_id: Uuid,
    ) -> Result<expense_categories::Model, WorkflowError> {
        require_admin_access(caller)?;

        let category = expense_categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::CategoryNotFound(category_id))?;

        let next = !category.is_active;
        let mut active: expense_categories::ActiveModel = category.into();
        active.is_active = Set(next);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Gets a single category by id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - The category is not found
    /// - Database operation fails
    pub async fn get(
        &self,
        caller: Option<&Caller>,
        category_id: Uuid,
    ) -> Result<expense_categories::Model, WorkflowError> {
        require_expense_access(caller)?;

        expense_categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::CategoryNotFound(category_id))
    }

    /// Lists active categories, paginated and ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - Database operation fails
    pub async fn list(
        &self,
        caller: Option<&Caller>,
        page: &PageRequest,
    ) -> Result<PageResponse<expense_categories::Model>, WorkflowError> {
        require_expense_access(caller)?;

        let query = expense_categories::Entity::find()
            .filter(expense_categories::Column::IsActive.eq(true));

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let data = query
            .order_by_asc(expense_categories::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists active categories as id/name pairs for selection lists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - Database operation fails
    pub async fn list_dropdown(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<CategoryOption>, WorkflowError> {
        require_expense_access(caller)?;

        let categories = expense_categories::Entity::find()
            .filter(expense_categories::Column::IsActive.eq(true))
            .order_by_asc(expense_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(categories
            .into_iter()
            .map(|c| CategoryOption {
                id: c.id,
                name: c.name,
            })
            .collect())
    }
}
