// src/store/mod.rs
//! Document store holding polls, choices and votes.
//!
//! The service only needs insert and lookup operations, so the store is
//! expressed as a small trait with a PostgreSQL adapter for deployments and
//! an in-process adapter for tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Choice, NewChoice, NewPoll, NewVote, Poll, Vote};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Carries the field name.
    #[error("duplicate {0}")]
    Conflict(String),

    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Listings come back in insertion order.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, poll: NewPoll) -> StoreResult<Poll>;
    async fn find_poll(&self, id: Uuid) -> StoreResult<Option<Poll>>;
    async fn find_poll_by_title(&self, title: &str) -> StoreResult<Option<Poll>>;
    async fn list_polls(&self) -> StoreResult<Vec<Poll>>;

    async fn insert_choice(&self, choice: NewChoice) -> StoreResult<Choice>;
    async fn find_choice(&self, id: Uuid) -> StoreResult<Option<Choice>>;
    async fn find_choice_by_title(&self, title: &str) -> StoreResult<Option<Choice>>;
    async fn list_choices(&self, poll_id: Uuid) -> StoreResult<Vec<Choice>>;

    async fn insert_vote(&self, vote: NewVote) -> StoreResult<Vote>;
    async fn list_votes(&self) -> StoreResult<Vec<Vote>>;
}
