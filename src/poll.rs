// src/poll.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    parse_expire_at, parse_id, Choice, CreateChoiceRequest, CreatePollRequest, NewChoice,
    NewPoll, NewVote, Poll, PollResult, Tally, Vote, DEFAULT_POLL_LIFETIME_DAYS,
};
use crate::store::PollStore;

/// Poll operations over an injected store. Cheap to clone; built once at
/// startup and shared by every handler.
#[derive(Clone)]
pub struct PollService {
    store: Arc<dyn PollStore>,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self { store }
    }

    pub async fn create_poll(&self, req: CreatePollRequest) -> AppResult<Poll> {
        req.validate()?;
        let title = present(req.title, "title")?;
        let expire_at = match req.expire_at {
            None => Utc::now() + Duration::days(DEFAULT_POLL_LIFETIME_DAYS),
            Some(raw) => parse_expire_at(&raw).ok_or_else(|| {
                AppError::Validation(format!("expireAt is not a valid date: {raw}"))
            })?,
        };

        if self.store.find_poll_by_title(&title).await?.is_some() {
            return Err(AppError::Conflict(format!("poll \"{title}\" already exists")));
        }

        // The store's unique index catches whatever slips past the check above.
        let poll = self.store.insert_poll(NewPoll { title, expire_at }).await?;
        tracing::info!(poll_id = %poll.id, title = %poll.title, "poll created");
        Ok(poll)
    }

    pub async fn create_choice(&self, req: CreateChoiceRequest) -> AppResult<Choice> {
        req.validate()?;
        let title = present(req.title, "title")?;
        let poll_id = present(req.poll_id, "pollId")?;

        let poll = self.find_poll(&poll_id).await?;
        if poll.is_expired_at(Utc::now()) {
            return Err(AppError::Expired(format!("poll \"{}\" has expired", poll.title)));
        }

        // Choice titles are unique across every poll.
        if self.store.find_choice_by_title(&title).await?.is_some() {
            return Err(AppError::Conflict(format!("choice \"{title}\" already exists")));
        }

        let choice = self
            .store
            .insert_choice(NewChoice {
                title,
                poll_id: poll.id,
            })
            .await?;
        tracing::info!(choice_id = %choice.id, poll_id = %poll.id, "choice created");
        Ok(choice)
    }

    pub async fn cast_vote(&self, choice_id: &str) -> AppResult<Vote> {
        let choice = match parse_id(choice_id) {
            Some(id) => self.store.find_choice(id).await?,
            None => None,
        }
        .ok_or_else(|| AppError::NotFound(format!("choice {choice_id} not found")))?;

        let poll = self
            .store
            .find_poll(choice.poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("poll {} not found", choice.poll_id)))?;

        let now = Utc::now();
        if poll.is_expired_at(now) {
            return Err(AppError::Expired(format!("poll \"{}\" has expired", poll.title)));
        }

        let vote = self
            .store
            .insert_vote(NewVote {
                choice_id: choice.id,
                created_at: now,
            })
            .await?;
        tracing::info!(vote_id = %vote.id, choice_id = %choice.id, "vote recorded");
        Ok(vote)
    }

    pub async fn list_polls(&self) -> AppResult<Vec<Poll>> {
        Ok(self.store.list_polls().await?)
    }

    /// Choices of a poll; empty when the poll has none or does not exist.
    pub async fn list_choices(&self, poll_id: &str) -> AppResult<Vec<Choice>> {
        match parse_id(poll_id) {
            Some(id) => Ok(self.store.list_choices(id).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn compute_result(&self, poll_id: &str) -> AppResult<PollResult> {
        let poll = self.find_poll(poll_id).await?;
        let choices = self.store.list_choices(poll.id).await?;
        let votes = self.store.list_votes().await?;

        Ok(PollResult {
            result: tally(&choices, &votes),
            poll,
        })
    }

    async fn find_poll(&self, poll_id: &str) -> AppResult<Poll> {
        let poll = match parse_id(poll_id) {
            Some(id) => self.store.find_poll(id).await?,
            None => None,
        };
        poll.ok_or_else(|| AppError::NotFound(format!("poll {poll_id} not found")))
    }
}

/// Unwraps a field `validate()` has already checked for presence.
fn present(value: Option<String>, field: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Pick the most voted choice. Votes for choices outside `choices` are
/// ignored. On equal counts the choice listed first wins. `None` when no
/// vote counts.
pub fn tally(choices: &[Choice], votes: &[Vote]) -> Option<Tally> {
    let mut counts: HashMap<Uuid, usize> = choices.iter().map(|c| (c.id, 0)).collect();
    for vote in votes {
        if let Some(count) = counts.get_mut(&vote.choice_id) {
            *count += 1;
        }
    }

    let mut winner: Option<(&Choice, usize)> = None;
    for choice in choices {
        let count = counts.get(&choice.id).copied().unwrap_or(0);
        if count > winner.map_or(0, |(_, best)| best) {
            winner = Some((choice, count));
        }
    }

    winner.map(|(choice, votes)| Tally {
        title: choice.title.clone(),
        votes,
    })
}
