//! # DeniDom Common Library
//!
//! Shared code for the DeniDom service and CLI:
//! - Database initialization, schema and reference seed data
//! - Authentication primitives (password hashing, bearer tokens)
//! - Configuration loading and root folder resolution
//! - Error type and time/UUID helpers

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
