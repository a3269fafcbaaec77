//! Listing, submission and vote command handlers.

use anyhow::{Result, bail};
use movierama_core::api::Feed;
use movierama_core::controllers::{CreateMovieController, ListingController, ListingState};
use movierama_core::model::{MovieId, SortKey, UserId, VoteAction};

use super::describe;
use crate::cli::{App, render};

fn listing_for(app: &App, user: Option<UserId>, sort: Option<&str>) -> ListingController {
    let feed = user.map_or(Feed::All, Feed::User);
    let sort = sort.map_or_else(|| app.default_sort(), SortKey::from);
    ListingController::new(feed).with_sort(sort)
}

fn require_session(app: &App) -> Result<()> {
    if !app.session.is_signed_in() {
        bail!("Not logged in. Run `movierama login` first.");
    }
    Ok(())
}

async fn load(app: &App, listing: &mut ListingController) -> Result<()> {
    listing.activate(&app.movies).await;
    if let ListingState::Failed(message) = listing.state() {
        bail!("Could not load movies: {message}");
    }
    Ok(())
}

pub async fn list(app: &App, sort: Option<&str>, user: Option<UserId>) -> Result<()> {
    let mut listing = listing_for(app, user, sort);
    load(app, &mut listing).await?;
    println!("{}", render::listing(&listing));
    Ok(())
}

pub async fn add(app: &App, title: &str, description: &str) -> Result<()> {
    require_session(app)?;

    let mut form = CreateMovieController::with_form(title, description);
    if !form.submit(&app.movies).await {
        let message = form.error().map_or_else(|| "unknown error".to_string(), describe);
        bail!("Could not add movie: {message}");
    }
    println!("Added \"{title}\".");

    if let Some(mut listing) = form.navigate_to().and_then(ListingController::for_route) {
        listing = listing.with_sort(app.default_sort());
        load(app, &mut listing).await?;
        println!("{}", render::listing(&listing));
    }
    Ok(())
}

pub async fn vote(
    app: &App,
    movie_id: MovieId,
    action: VoteAction,
    remove: bool,
    user: Option<UserId>,
) -> Result<()> {
    require_session(app)?;

    let mut listing = listing_for(app, user, None);
    load(app, &mut listing).await?;

    let outcome = if remove {
        listing.remove_action(&app.movies, movie_id, action).await
    } else {
        listing.make_action(&app.movies, movie_id, action).await
    };
    if let Err(err) = outcome {
        bail!("Vote failed: {}", describe(&err));
    }

    match listing.movie(movie_id) {
        Some(movie) => println!("{}", render::movies_table(std::slice::from_ref(movie))),
        None => println!("Vote recorded for movie {movie_id}."),
    }
    Ok(())
}
