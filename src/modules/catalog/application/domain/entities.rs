use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;

pub const SLUG_MAX_LENGTH: usize = 50;
pub const NAME_MAX_LENGTH: usize = 256;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("static slug pattern"));

pub type TitleId = i32;

//
// ──────────────────────────────────────────────────────────
// Taxonomy (categories and genres)
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Category,
    Genre,
}

impl TaxonomyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "category",
            TaxonomyKind::Genre => "genre",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("Slug is required")]
    Empty,

    #[error("Slug must not exceed 50 characters")]
    TooLong,

    #[error("Slug may contain only letters, digits, hyphens and underscores")]
    InvalidCharacters,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    pub fn parse(raw: &str) -> Result<Self, SlugError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(SlugError::Empty);
        }

        if value.chars().count() > SLUG_MAX_LENGTH {
            return Err(SlugError::TooLong);
        }

        if !SLUG_PATTERN.is_match(value) {
            return Err(SlugError::InvalidCharacters);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Name is required")]
    Empty,

    #[error("Name must not exceed 256 characters")]
    TooLong,
}

/// Category, genre and title names share the same bounds.
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(NameError::Empty);
    }

    if value.chars().count() > NAME_MAX_LENGTH {
        return Err(NameError::TooLong);
    }

    Ok(value.to_string())
}

//
// ──────────────────────────────────────────────────────────
// Title
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Year must not be later than {current}")]
pub struct YearInFuture {
    pub current: i32,
}

pub fn validate_year(year: i32) -> Result<i32, YearInFuture> {
    validate_year_against(year, Utc::now().year())
}

fn validate_year_against(year: i32, current: i32) -> Result<i32, YearInFuture> {
    if year > current {
        return Err(YearInFuture { current });
    }
    Ok(year)
}

/// A title as read back, with its mean review score.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleView {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genres: Vec<TaxonomyEntry>,
    pub category: Option<TaxonomyEntry>,
}
