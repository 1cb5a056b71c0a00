//! Database initialization, schema, models and settings access

pub mod init;
pub mod models;
pub mod seed;
pub mod settings;

pub use init::*;
pub use models::*;
pub use settings::*;
