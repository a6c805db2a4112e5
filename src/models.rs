// src/models.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Wire pattern of a poll's `expireAt`, e.g. `17-11-2026 09:05`.
pub const EXPIRE_AT_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Wire pattern of a vote's `createdAt` on a 12-hour clock, e.g. `2026-10-18 09:05`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %I:%M";

/// Lifetime in days given to polls created without an explicit `expireAt`.
pub const DEFAULT_POLL_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    #[serde(serialize_with = "serialize_expire_at")]
    pub expire_at: DateTime<Utc>,
}

impl Poll {
    /// A poll accepts no more choices or votes once `now` has passed its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: Uuid,
    pub title: String,
    pub poll_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub choice_id: Uuid,
    #[serde(serialize_with = "serialize_created_at")]
    pub created_at: DateTime<Utc>,
}

/// Poll fields handed to the store; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub title: String,
    pub expire_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChoice {
    pub title: String,
    pub poll_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewVote {
    pub choice_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /poll`. Fields are optional so that absence is reported as a
/// validation failure instead of a deserialisation rejection.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[validate(required(message = "title is required"), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "expireAt must not be empty"))]
    pub expire_at: Option<String>,
}

/// Body of `POST /choice`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChoiceRequest {
    #[validate(required(message = "title is required"), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(required(message = "pollId is required"), custom(function = "not_blank"))]
    pub poll_id: Option<String>,
}

/// Titles are stored as sent; only whitespace-only values are refused.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Winning choice of a poll and how many votes it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub title: String,
    pub votes: usize,
}

/// A poll's stored fields merged with its outcome. `result` is `null` while
/// the poll has no votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollResult {
    #[serde(flatten)]
    pub poll: Poll,
    pub result: Option<Tally>,
}

/// Parse a client supplied `expireAt`. Accepts the same `DD-MM-YYYY HH:mm`
/// pattern the API emits, or RFC 3339. Naive values are read as UTC.
pub fn parse_expire_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, EXPIRE_AT_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an identifier received on the wire. Malformed ids match nothing.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn serialize_expire_at<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&value.format(EXPIRE_AT_FORMAT))
}

fn serialize_created_at<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&value.format(CREATED_AT_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn poll_serializes_expire_at_day_first() {
        let poll = Poll {
            id: Uuid::nil(),
            title: "Lunch".to_string(),
            expire_at: at(2026, 11, 7, 21, 5),
        };
        let value = serde_json::to_value(&poll).unwrap();
        assert_eq!(value["expireAt"], json!("07-11-2026 21:05"));
        assert_eq!(value["title"], json!("Lunch"));
        assert_eq!(value["id"], json!(Uuid::nil().to_string()));
    }

    #[test]
    fn vote_serializes_created_at_on_twelve_hour_clock() {
        let vote = Vote {
            id: Uuid::nil(),
            choice_id: Uuid::nil(),
            created_at: at(2026, 10, 18, 21, 5),
        };
        let value = serde_json::to_value(&vote).unwrap();
        assert_eq!(value["createdAt"], json!("2026-10-18 09:05"));
        assert!(value.get("choiceId").is_some());
    }

    #[test]
    fn parse_expire_at_accepts_both_patterns() {
        assert_eq!(parse_expire_at("01-02-2030 13:45"), Some(at(2030, 2, 1, 13, 45)));
        assert_eq!(
            parse_expire_at("2030-02-01T13:45:00+02:00"),
            Some(at(2030, 2, 1, 11, 45))
        );
        assert_eq!(parse_expire_at("next tuesday"), None);
        assert_eq!(parse_expire_at("31-02-2030 10:00"), None);
    }

    #[test]
    fn expiry_is_exclusive_of_the_deadline() {
        let poll = Poll {
            id: Uuid::nil(),
            title: "t".to_string(),
            expire_at: at(2030, 1, 1, 12, 0),
        };
        assert!(!poll.is_expired_at(at(2030, 1, 1, 12, 0)));
        assert!(poll.is_expired_at(at(2030, 1, 1, 12, 1)));
    }

    #[test]
    fn result_flattens_poll_fields() {
        let result = PollResult {
            poll: Poll {
                id: Uuid::nil(),
                title: "Best Language".to_string(),
                expire_at: at(2030, 1, 1, 0, 0),
            },
            result: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["title"], json!("Best Language"));
        assert_eq!(value["result"], json!(null));
    }

    #[test]
    fn requests_reject_missing_and_blank_fields() {
        assert!(CreatePollRequest::default().validate().is_err());
        let blank = CreatePollRequest {
            title: Some("  ".to_string()),
            expire_at: None,
        };
        assert!(blank.validate().is_err());
        let padded = CreatePollRequest {
            title: Some(" Go".to_string()),
            expire_at: None,
        };
        assert!(padded.validate().is_ok());

        let no_poll = CreateChoiceRequest {
            title: Some("Go".to_string()),
            poll_id: None,
        };
        let errors = no_poll.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("poll_id"));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-an-id").is_none());
        assert_eq!(parse_id(&Uuid::nil().to_string()), Some(Uuid::nil()));
    }
}
