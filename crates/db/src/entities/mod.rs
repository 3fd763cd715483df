//! `SeaORM` entity definitions.

pub mod expense_categories;
pub mod expense_edit_requests;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
