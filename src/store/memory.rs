// src/store/memory.rs
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PollStore, StoreError, StoreResult};
use crate::models::{Choice, NewChoice, NewPoll, NewVote, Poll, Vote};

#[derive(Default)]
struct Collections {
    polls: Vec<Poll>,
    choices: Vec<Choice>,
    votes: Vec<Vote>,
}

/// Process-local store. Title uniqueness is checked and written under one
/// write lock, so concurrent duplicates cannot both get in.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, poll: NewPoll) -> StoreResult<Poll> {
        let mut inner = self.inner.write().await;
        if inner.polls.iter().any(|p| p.title == poll.title) {
            return Err(StoreError::Conflict("poll title".to_string()));
        }
        let poll = Poll {
            id: Uuid::new_v4(),
            title: poll.title,
            expire_at: poll.expire_at,
        };
        inner.polls.push(poll.clone());
        Ok(poll)
    }

    async fn find_poll(&self, id: Uuid) -> StoreResult<Option<Poll>> {
        let inner = self.inner.read().await;
        Ok(inner.polls.iter().find(|p| p.id == id).cloned())
    }

    async fn find_poll_by_title(&self, title: &str) -> StoreResult<Option<Poll>> {
        let inner = self.inner.read().await;
        Ok(inner.polls.iter().find(|p| p.title == title).cloned())
    }

    async fn list_polls(&self) -> StoreResult<Vec<Poll>> {
        Ok(self.inner.read().await.polls.clone())
    }

    async fn insert_choice(&self, choice: NewChoice) -> StoreResult<Choice> {
        let mut inner = self.inner.write().await;
        if inner.choices.iter().any(|c| c.title == choice.title) {
            return Err(StoreError::Conflict("choice title".to_string()));
        }
        let choice = Choice {
            id: Uuid::new_v4(),
            title: choice.title,
            poll_id: choice.poll_id,
        };
        inner.choices.push(choice.clone());
        Ok(choice)
    }

    async fn find_choice(&self, id: Uuid) -> StoreResult<Option<Choice>> {
        let inner = self.inner.read().await;
        Ok(inner.choices.iter().find(|c| c.id == id).cloned())
    }

    async fn find_choice_by_title(&self, title: &str) -> StoreResult<Option<Choice>> {
        let inner = self.inner.read().await;
        Ok(inner.choices.iter().find(|c| c.title == title).cloned())
    }

    async fn list_choices(&self, poll_id: Uuid) -> StoreResult<Vec<Choice>> {
        let inner = self.inner.read().await;
        Ok(inner
            .choices
            .iter()
            .filter(|c| c.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn insert_vote(&self, vote: NewVote) -> StoreResult<Vote> {
        let vote = Vote {
            id: Uuid::new_v4(),
            choice_id: vote.choice_id,
            created_at: vote.created_at,
        };
        self.inner.write().await.votes.push(vote.clone());
        Ok(vote)
    }

    async fn list_votes(&self) -> StoreResult<Vec<Vote>> {
        Ok(self.inner.read().await.votes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn duplicate_titles_are_rejected() {
        let store = MemoryStore::new();
        let new_poll = || NewPoll {
            title: "Pizza or pasta".to_string(),
            expire_at: Utc::now(),
        };
        let poll = store.insert_poll(new_poll()).await.unwrap();
        assert_eq!(
            store.insert_poll(new_poll()).await,
            Err(StoreError::Conflict("poll title".to_string()))
        );

        let new_choice = |poll_id| NewChoice {
            title: "Pizza".to_string(),
            poll_id,
        };
        store.insert_choice(new_choice(poll.id)).await.unwrap();
        assert!(matches!(
            store.insert_choice(new_choice(Uuid::new_v4())).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.list_polls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn choices_are_listed_per_poll_in_insertion_order() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        for (title, poll_id) in [("one", a), ("two", b), ("three", a)] {
            store
                .insert_choice(NewChoice {
                    title: title.to_string(),
                    poll_id,
                })
                .await
                .unwrap();
        }
        let titles: Vec<_> = store
            .list_choices(a)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["one", "three"]);
        assert!(store.list_choices(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
