// src/lib.rs
//! Poll backend: create polls, attach choices, vote and read the winner.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod routes;
pub mod store;

pub use error::{AppError, AppResult};
pub use poll::PollService;
pub use routes::create_routes;
