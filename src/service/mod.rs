//! Consistency engine for user records
//!
//! Sits between the transport and the store: runs the validator, owns email
//! normalization and enforces existence and uniqueness before any write.

mod bulk;
mod user_service;

pub use user_service::UserService;
