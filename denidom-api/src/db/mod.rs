//! Data access for denidom-api
//!
//! Every query on owned rows carries the caller's user id; rows belonging to
//! someone else are indistinguishable from missing ones.

pub mod clients;
pub mod estimates;
pub mod projects;
pub mod reference;
pub mod users;
