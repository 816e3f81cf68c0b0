//! Officer desk for a grievance-tracking backend.
//!
//! The desk fetches complaints over HTTP, normalizes them into [`models::Complaint`]
//! values, and keeps a filtered, paginated board in memory. Assignment and
//! progress updates go through the server first and are applied locally only
//! once confirmed.

pub mod api;
pub mod board;
pub mod commands;
pub mod config;
pub mod desk;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod session;
pub mod store;
pub mod wire;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use api::{GrievanceApi, HttpApi};
pub use config::Config;
pub use desk::Desk;
pub use error::{ClientError, WorkflowError};
