//! Movie listing, submission and voting calls.

use super::{ApiContext, ApiResult, ListingScope};
use crate::model::{Movie, MovieId, MovieList, NewMovie, SortKey, UserId, VoteAction};

/// Which listing a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Every user's movies
    All,
    /// Movies submitted by one user
    User(UserId),
}

/// Client for the movie endpoints.
#[derive(Debug, Clone)]
pub struct MovieClient {
    ctx: ApiContext,
}

impl MovieClient {
    pub fn new(ctx: ApiContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    /// `GET /movies`
    pub async fn list_public(&self, sort: &SortKey) -> ApiResult<Vec<Movie>> {
        self.list_feed(Feed::All, ListingScope::Public, sort).await
    }

    /// `GET /api/v1/movies`, with per-caller vote flags.
    pub async fn list(&self, sort: &SortKey) -> ApiResult<Vec<Movie>> {
        self.list_feed(Feed::All, ListingScope::Authenticated, sort)
            .await
    }

    pub async fn list_user_movies_public(
        &self,
        user_id: UserId,
        sort: &SortKey,
    ) -> ApiResult<Vec<Movie>> {
        self.list_feed(Feed::User(user_id), ListingScope::Public, sort)
            .await
    }

    pub async fn list_user_movies(&self, user_id: UserId, sort: &SortKey) -> ApiResult<Vec<Movie>> {
        self.list_feed(Feed::User(user_id), ListingScope::Authenticated, sort)
            .await
    }

    /// Fetches `feed` from the base path picked by `scope`.
    pub async fn list_feed(
        &self,
        feed: Feed,
        scope: ListingScope,
        sort: &SortKey,
    ) -> ApiResult<Vec<Movie>> {
        let endpoints = self.ctx.endpoints();
        let url = match feed {
            Feed::All => endpoints.movies(scope, sort),
            Feed::User(user_id) => endpoints.user_movies(scope, user_id, sort),
        };
        let list: MovieList = self.ctx.get_json(url, "movie list").await?;
        tracing::debug!(?feed, %scope, %sort, count = list.movies.len(), "movies listed");
        Ok(list.movies)
    }

    /// `POST /api/v1/movies`. The server answers 201 with no useful body.
    pub async fn create(&self, movie: &NewMovie) -> ApiResult<()> {
        let url = self.ctx.endpoints().create_movie();
        self.ctx.post(url, Some(movie)).await?;
        tracing::info!(title = %movie.title, "movie submitted");
        Ok(())
    }

    pub async fn make_action(&self, movie_id: MovieId, action: VoteAction) -> ApiResult<()> {
        let url = self.ctx.endpoints().vote(movie_id, action);
        self.ctx.post(url, None::<&()>).await?;
        tracing::info!(movie_id, %action, "vote registered");
        Ok(())
    }

    pub async fn remove_action(&self, movie_id: MovieId, action: VoteAction) -> ApiResult<()> {
        let url = self.ctx.endpoints().remove_vote(movie_id, action);
        self.ctx.post(url, None::<&()>).await?;
        tracing::info!(movie_id, %action, "vote removed");
        Ok(())
    }
}
