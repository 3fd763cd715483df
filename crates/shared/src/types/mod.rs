//! Shared plain types used across crates.

pub mod pagination;

pub use pagination::{PageMeta, PageRequest, PageResponse};
