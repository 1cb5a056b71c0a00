//! HTTP handlers

pub mod ai;
pub mod auth;
pub mod calculator;
pub mod clients;
pub mod estimates;
pub mod export;
pub mod health;
pub mod middleware;
pub mod projects;
pub mod reference;

pub use health::health_routes;
