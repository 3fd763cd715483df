//! Core business logic for Outlay.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and the edit-request
//! state machine live here.
//!
//! # Modules
//!
//! - `expense` - Expense ledger domain: statuses, roles, access gates, and
//!   the edit-request review state machine

pub mod expense;
