//! Core types and trait definitions for billwatch subscriptions.
//!
//! Profiles, subscriptions and sent-notification records, plus the pure
//! presentation logic on subscriptions. Free of HTTP and database
//! dependencies; the storage and API crates build on it.

pub mod error;
pub mod notification;
pub mod profile;
pub mod reference;
pub mod search;
pub mod services;
pub mod store;
pub mod subscription;

pub use error::{Error, Result};
