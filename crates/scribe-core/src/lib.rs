//! # Scribe Core
//!
//! The domain layer of the Scribe post service.
//! This crate contains the post model, the store ports and the service that
//! implements create/list/get/update/delete on top of them. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::PostService;
