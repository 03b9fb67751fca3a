//! `golden-client`
//!
//! **Responsibility:** client-side lifecycle of catalog types.
//!
//! This crate provides:
//! - A cached, always-reloaded mirror of the remote catalog type list
//! - Guarded create/edit/removal (removal deactivates; in-use types are blocked)
//! - Transient success/highlight feedback with cancellable expiry timers
//!
//! The remote catalog API stays the authority; it is reached only through
//! [`CatalogTypeService`].

pub mod config;
pub mod confirm;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod in_memory;
pub mod service;
pub mod submission;

pub use config::ClientConfig;
pub use confirm::{Confirm, FixedConfirm};
pub use controller::{
    ListView, Outcome, Removal, ResourceLifecycleController, ResourceState, Saved, SkipReason,
};
pub use error::{CatalogTypeError, FieldError};
pub use in_memory::InMemoryCatalogTypeService;
pub use service::{CatalogTypeService, ServiceError};
pub use submission::{SubmissionGuard, SubmissionPermit};
