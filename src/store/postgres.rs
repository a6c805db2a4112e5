// src/store/postgres.rs
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PollStore, StoreError, StoreResult};
use crate::models::{Choice, NewChoice, NewPoll, NewVote, Poll, Vote};

/// PostgreSQL-backed store. Ids come from `gen_random_uuid()` and title
/// uniqueness is enforced by unique indexes, see `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique-index violations become `Conflict` on `field`.
fn map_err(field: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |err| match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(field.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl PollStore for PgStore {
    async fn insert_poll(&self, poll: NewPoll) -> StoreResult<Poll> {
        sqlx::query_as::<_, Poll>(
            "INSERT INTO polls (title, expire_at) VALUES ($1, $2) RETURNING id, title, expire_at",
        )
        .bind(&poll.title)
        .bind(poll.expire_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("poll title"))
    }

    async fn find_poll(&self, id: Uuid) -> StoreResult<Option<Poll>> {
        sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_poll_by_title(&self, title: &str) -> StoreResult<Option<Poll>> {
        sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls WHERE title = $1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_polls(&self) -> StoreResult<Vec<Poll>> {
        sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn insert_choice(&self, choice: NewChoice) -> StoreResult<Choice> {
        sqlx::query_as::<_, Choice>(
            "INSERT INTO choices (title, poll_id) VALUES ($1, $2) RETURNING id, title, poll_id",
        )
        .bind(&choice.title)
        .bind(choice.poll_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("choice title"))
    }

    async fn find_choice(&self, id: Uuid) -> StoreResult<Option<Choice>> {
        sqlx::query_as::<_, Choice>("SELECT id, title, poll_id FROM choices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_choice_by_title(&self, title: &str) -> StoreResult<Option<Choice>> {
        sqlx::query_as::<_, Choice>("SELECT id, title, poll_id FROM choices WHERE title = $1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_choices(&self, poll_id: Uuid) -> StoreResult<Vec<Choice>> {
        sqlx::query_as::<_, Choice>(
            "SELECT id, title, poll_id FROM choices WHERE poll_id = $1 ORDER BY seq",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }

    async fn insert_vote(&self, vote: NewVote) -> StoreResult<Vote> {
        sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (choice_id, created_at) VALUES ($1, $2) RETURNING id, choice_id, created_at",
        )
        .bind(vote.choice_id)
        .bind(vote.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }

    async fn list_votes(&self) -> StoreResult<Vec<Vote>> {
        sqlx::query_as::<_, Vote>("SELECT id, choice_id, created_at FROM votes ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug, thiserror::Error)]
    #[error("duplicate key value violates unique constraint")]
    struct UniqueViolation;

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_is_a_conflict() {
        let err = sqlx::Error::Database(Box::new(UniqueViolation));
        assert_eq!(
            map_err("poll title")(err),
            StoreError::Conflict("poll title".to_string())
        );
    }

    #[test]
    fn other_failures_are_backend_errors() {
        assert!(matches!(
            map_err("choice title")(sqlx::Error::PoolTimedOut),
            StoreError::Backend(_)
        ));
        assert!(matches!(backend(sqlx::Error::RowNotFound), StoreError::Backend(_)));
    }
}
