//! Core types and services for the Bolsa de Trabajo job-board client.
//!
//! This crate is deliberately free of HTTP dependencies. It talks to the
//! backend only through the [`backend::JobBoardBackend`] trait; `bolsa-client`
//! supplies the HTTP implementation and `bolsa-cli` the views.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod application;
pub mod backend;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod matching;
pub mod offer;
pub mod principal;
pub mod profile;
pub mod session;
pub mod token;
pub mod view;

mod wire;

pub use error::{Error, ErrorKind, Result};

#[cfg(test)]
mod testing;
