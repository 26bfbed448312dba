use chrono::{DateTime, Utc};

use crate::auth::application::domain::entities::UserId;
use crate::catalog::application::domain::entities::TitleId;

pub type ReviewId = i32;
pub type CommentId = i32;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Score must be between 1 and 10")]
pub struct ScoreOutOfRange;

/// Review score in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(i16);

impl Score {
    pub fn parse(raw: i32) -> Result<Self, ScoreOutOfRange> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&raw) {
            return Err(ScoreOutOfRange);
        }
        Ok(Self(raw as i16))
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Text is required")]
pub struct EmptyText;

pub fn validate_text(raw: &str) -> Result<String, EmptyText> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(EmptyText);
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub author_id: UserId,
    /// Author's username.
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}
