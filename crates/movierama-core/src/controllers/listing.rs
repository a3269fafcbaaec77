//! Movie listing view-model, shared by the site-wide and per-user screens.

use crate::api::{ApiError, ApiResult, Feed, ListingScope, MovieClient, resolve_listing_endpoint};
use crate::model::{Movie, MovieId, SortKey, UserId, VoteAction};
use crate::request_id::{LatestOnly, RequestId};
use crate::routes::{Route, parse_user_id_param};
use crate::session::SessionState;

/// What the listing currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListingState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Movie>),
    Failed(String),
}

/// A list fetch handed out by [`ListingController::begin_load`].
///
/// The result must be passed back through [`ListingController::finish_load`]
/// together with `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub id: RequestId,
    pub feed: Feed,
    pub scope: ListingScope,
    pub sort: SortKey,
}

#[derive(Debug)]
pub struct ListingController {
    feed: Feed,
    sort: SortKey,
    state: ListingState,
    notice: Option<String>,
    loads: LatestOnly,
}

impl ListingController {
    pub fn new(feed: Feed) -> Self {
        Self {
            feed,
            sort: SortKey::default(),
            state: ListingState::Idle,
            notice: None,
            loads: LatestOnly::default(),
        }
    }

    /// Every user's movies.
    pub fn site_wide() -> Self {
        Self::new(Feed::All)
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self::new(Feed::User(user_id))
    }

    /// Builds a per-user listing from the `user_id` route parameter.
    ///
    /// # Errors
    /// Returns an error if the parameter is not numeric.
    pub fn from_route_param(param: &str) -> Result<Self, String> {
        parse_user_id_param(param).map(Self::for_user)
    }

    /// Listing shown on `route`, if that screen is a listing.
    pub fn for_route(route: Route) -> Option<Self> {
        match route {
            Route::Home => Some(Self::site_wide()),
            Route::UserMovies(user_id) => Some(Self::for_user(user_id)),
            Route::Login | Route::Register | Route::AddMovie => None,
        }
    }

    /// Sets the initial sort key without issuing a request.
    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub fn sort(&self) -> &SortKey {
        &self.sort
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Movies on display; empty unless a load succeeded.
    pub fn movies(&self) -> &[Movie] {
        match &self.state {
            ListingState::Loaded(movies) => movies,
            _ => &[],
        }
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies().iter().find(|m| m.id == movie_id)
    }

    fn movie_mut(&mut self, movie_id: MovieId) -> Option<&mut Movie> {
        match &mut self.state {
            ListingState::Loaded(movies) => movies.iter_mut().find(|m| m.id == movie_id),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loads.has_active()
    }

    /// Last vote error, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Points the controller at another feed. The next load fetches it, and
    /// a fetch still in flight for the old feed is discarded on arrival.
    pub fn switch_feed(&mut self, feed: Feed) {
        if self.feed != feed {
            self.loads.cancel();
            self.feed = feed;
            self.state = ListingState::Idle;
            self.notice = None;
        }
    }

    /// Starts a list fetch with `sort`, superseding any fetch in flight.
    ///
    /// The scope comes from the session: authenticated when a token is
    /// present, public otherwise.
    pub fn begin_load(&mut self, session: &SessionState, sort: SortKey) -> ListingRequest {
        let scope = resolve_listing_endpoint(session.is_signed_in());
        self.sort = sort;
        self.state = ListingState::Loading;
        ListingRequest {
            id: self.loads.begin(),
            feed: self.feed,
            scope,
            sort: self.sort.clone(),
        }
    }

    /// Applies a list result. Returns false when a newer fetch superseded it,
    /// in which case nothing changes.
    pub fn finish_load(&mut self, id: RequestId, result: ApiResult<Vec<Movie>>) -> bool {
        if !self.loads.finish_if_active(id) {
            tracing::debug!(?id, "dropping stale movie list");
            return false;
        }
        self.state = match result {
            Ok(movies) => ListingState::Loaded(movies),
            Err(err) => ListingState::Failed(err.message),
        };
        true
    }

    /// Loads the listing with the current sort key.
    pub async fn activate(&mut self, client: &MovieClient) {
        let sort = self.sort.clone();
        self.resort(client, sort).await;
    }

    /// Reloads with `sort`, replacing the whole list.
    pub async fn resort(&mut self, client: &MovieClient, sort: SortKey) {
        let request = self.begin_load(client.context().session(), sort);
        let result = client
            .list_feed(request.feed, request.scope, &request.sort)
            .await;
        self.finish_load(request.id, result);
    }

    /// Casts a vote. The local copy moves only after the server accepts.
    ///
    /// # Errors
    /// Returns the API error, which is also kept in [`Self::notice`].
    pub async fn make_action(
        &mut self,
        client: &MovieClient,
        movie_id: MovieId,
        action: VoteAction,
    ) -> Result<(), ApiError> {
        let result = client.make_action(movie_id, action).await;
        self.apply_vote(movie_id, result, |movie| movie.register_vote(action))
    }

    /// Retracts a vote. The local copy moves only after the server accepts.
    ///
    /// # Errors
    /// Returns the API error, which is also kept in [`Self::notice`].
    pub async fn remove_action(
        &mut self,
        client: &MovieClient,
        movie_id: MovieId,
        action: VoteAction,
    ) -> Result<(), ApiError> {
        let result = client.remove_action(movie_id, action).await;
        self.apply_vote(movie_id, result, |movie| movie.retract_vote(action))
    }

    fn apply_vote(
        &mut self,
        movie_id: MovieId,
        result: ApiResult<()>,
        update: impl FnOnce(&mut Movie) -> bool,
    ) -> Result<(), ApiError> {
        match result {
            Ok(()) => {
                self.notice = None;
                let changed = self.movie_mut(movie_id).is_some_and(update);
                if !changed {
                    tracing::debug!(movie_id, "vote not reflected in local list");
                }
                Ok(())
            }
            Err(err) => {
                self.notice = Some(err.message.clone());
                Err(err)
            }
        }
    }
}
