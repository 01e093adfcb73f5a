//! HTTP transport for the Bolsa de Trabajo REST backend.
//!
//! [`HttpBackend`] implements `bolsa_core::backend::JobBoardBackend` with
//! `reqwest`. Non-2xx answers are mapped onto the core error taxonomy by
//! [`error`].

mod backend;
pub mod error;

pub use backend::{ClientConfig, DEFAULT_BASE_URL, HttpBackend};
