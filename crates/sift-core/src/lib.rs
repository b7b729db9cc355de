//! Core types and trait definitions for the Sift query client.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it describes the data the session moves
//! around and the boundaries it talks to.

pub mod document;
pub mod error;
pub mod query;
pub mod schema;
pub mod service;
pub mod settings;
pub mod status;

pub use error::{Error, Result};
