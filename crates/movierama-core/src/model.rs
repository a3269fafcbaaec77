//! Wire types shared by the API clients and the controllers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub type MovieId = u64;
pub type UserId = u64;

/// A movie as returned by the listing endpoints.
///
/// `likes`/`hates` and the `user_*` flags are server-authoritative. The only
/// local changes allowed are the ±1 vote adjustments in [`Movie::register_vote`]
/// and [`Movie::retract_vote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted_by: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub hates: u64,
    #[serde(default)]
    pub user_liked: bool,
    #[serde(default)]
    pub user_hated: bool,
    #[serde(default)]
    pub is_same_user: bool,
    #[serde(default)]
    pub time_ago: String,
}

impl Movie {
    /// Applies a vote the server just accepted.
    ///
    /// Returns false when the flag was already set, in which case the count is
    /// left alone.
    pub fn register_vote(&mut self, action: VoteAction) -> bool {
        let (count, flag) = self.tally_mut(action);
        if *flag {
            return false;
        }
        *count += 1;
        *flag = true;
        true
    }

    /// Reverts a vote the server just removed.
    ///
    /// Returns false when there was no vote of that kind to retract.
    pub fn retract_vote(&mut self, action: VoteAction) -> bool {
        let (count, flag) = self.tally_mut(action);
        if !*flag {
            return false;
        }
        *count = count.saturating_sub(1);
        *flag = false;
        true
    }

    /// Returns whether the caller currently holds a vote of this kind.
    pub fn has_vote(&self, action: VoteAction) -> bool {
        match action {
            VoteAction::Like => self.user_liked,
            VoteAction::Hate => self.user_hated,
        }
    }

    fn tally_mut(&mut self, action: VoteAction) -> (&mut u64, &mut bool) {
        match action {
            VoteAction::Like => (&mut self.likes, &mut self.user_liked),
            VoteAction::Hate => (&mut self.hates, &mut self.user_hated),
        }
    }
}

/// Envelope returned by every listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieList {
    /// The API encodes an empty result as `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub movies: Vec<Movie>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Movie>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Movie>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for `POST /api/v1/movies`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
}

/// Listing order requested through the `sort` query parameter.
///
/// Unknown keys are passed through verbatim; the server decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Date,
    Likes,
    Hates,
    Other(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Date => "date",
            SortKey::Likes => "likes",
            SortKey::Hates => "hates",
            SortKey::Other(key) => key,
        }
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "date" => SortKey::Date,
            "likes" => SortKey::Likes,
            "hates" => SortKey::Hates,
            other => SortKey::Other(other.to_string()),
        }
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(SortKey::from(value))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote kinds accepted by the `action` / `remove_action` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteAction {
    Like,
    Hate,
}

impl VoteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteAction::Like => "like",
            VoteAction::Hate => "hate",
        }
    }
}

impl FromStr for VoteAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "like" => Ok(VoteAction::Like),
            "hate" => Ok(VoteAction::Hate),
            other => Err(format!("Unknown vote action: {other} (expected like or hate)")),
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
