//! Endpoint selection and URL construction.
//!
//! The API serves every listing twice: a public variant at the root and an
//! authenticated variant under `/api/v1` that adds per-caller flags
//! (`user_liked`, `user_hated`, `is_same_user`). Which one to call is decided
//! in exactly one place, [`resolve_listing_endpoint`].

use std::fmt;

use anyhow::{Context, Result};
use url::Url;

use crate::model::{MovieId, SortKey, UserId, VoteAction};

const AUTHENTICATED_PREFIX: [&str; 2] = ["api", "v1"];

/// Base path family for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingScope {
    Public,
    Authenticated,
}

impl fmt::Display for ListingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingScope::Public => write!(f, "public"),
            ListingScope::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Picks the listing base path: authenticated when a session token is
/// present, public otherwise.
pub fn resolve_listing_endpoint(session_present: bool) -> ListingScope {
    if session_present {
        ListingScope::Authenticated
    } else {
        ListingScope::Public
    }
}

/// URL builder rooted at the configured API URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root: Url,
}

impl Endpoints {
    /// # Errors
    /// Returns an error if `api_url` is not an absolute http(s) URL.
    pub fn new(api_url: &str) -> Result<Self> {
        let root = Url::parse(api_url.trim())
            .with_context(|| format!("Invalid MovieRama API URL: {api_url}"))?;
        if root.cannot_be_a_base() || !matches!(root.scheme(), "http" | "https") {
            anyhow::bail!("MovieRama API URL must be an http(s) URL: {api_url}");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Whether `url` lives under the authenticated base path.
    pub fn is_authenticated(&self, url: &Url) -> bool {
        let prefix = self.build(ListingScope::Authenticated, &[]);
        url.as_str().starts_with(prefix.as_str())
    }

    pub fn movies(&self, scope: ListingScope, sort: &SortKey) -> Url {
        let mut url = self.build(scope, &["movies"]);
        url.query_pairs_mut().append_pair("sort", sort.as_str());
        url
    }

    pub fn user_movies(&self, scope: ListingScope, user_id: UserId, sort: &SortKey) -> Url {
        let user_id = user_id.to_string();
        let mut url = self.build(scope, &["users", &user_id, "movies"]);
        url.query_pairs_mut().append_pair("sort", sort.as_str());
        url
    }

    pub fn create_movie(&self) -> Url {
        self.build(ListingScope::Authenticated, &["movies"])
    }

    pub fn vote(&self, movie_id: MovieId, action: VoteAction) -> Url {
        let movie_id = movie_id.to_string();
        self.build(
            ListingScope::Authenticated,
            &["movies", &movie_id, "action", action.as_str()],
        )
    }

    pub fn remove_vote(&self, movie_id: MovieId, action: VoteAction) -> Url {
        let movie_id = movie_id.to_string();
        self.build(
            ListingScope::Authenticated,
            &["movies", &movie_id, "remove_action", action.as_str()],
        )
    }

    pub fn login(&self) -> Url {
        self.build(ListingScope::Authenticated, &["auth", "login"])
    }

    pub fn register(&self) -> Url {
        self.build(ListingScope::Authenticated, &["auth", "register"])
    }

    fn build(&self, scope: ListingScope, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Checked in `new`: the root can always be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            if scope == ListingScope::Authenticated {
                path.extend(AUTHENTICATED_PREFIX);
            }
            path.extend(segments);
        }
        url
    }
}
