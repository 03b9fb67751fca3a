//! Catalog types domain module.
//!
//! A catalog type is a small taxonomy entity that classifies products. This
//! crate holds its data model and the local validation rules that run before
//! any remote call (no IO, no HTTP, no storage).

pub mod catalog_type;
pub mod messages;

pub use catalog_type::{
    CatalogType, CatalogTypeId, CatalogTypeInput, Description, RemovalAction,
    DESCRIPTION_FIELD, DESCRIPTION_MAX_LEN,
};
