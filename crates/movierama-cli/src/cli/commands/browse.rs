//! Interactive listing mode.
//!
//! One listing controller lives for the whole session; each input line is a
//! command that resorts, votes or switches feed, and the listing is redrawn
//! after every command.

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use movierama_core::api::{ApiError, Feed};
use movierama_core::controllers::ListingController;
use movierama_core::model::{MovieId, SortKey, UserId, VoteAction};
use movierama_core::routes::{Route, parse_user_id_param};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::describe;
use crate::cli::{App, render};

const HELP: &str = "\
Commands:
  sort KEY      reload sorted by date, likes or hates
  like ID       like a movie       unlike ID   remove your like
  hate ID       hate a movie       unhate ID   remove your hate
  user ID       show one user's movies
  all           show every movie
  go PATH       open a listing by path, e.g. /users/5/movies
  refresh       reload the current listing
  help          show this help
  quit          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Sort(SortKey),
    Vote(MovieId, VoteAction),
    Unvote(MovieId, VoteAction),
    User(UserId),
    Go(Route),
    All,
    Refresh,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let arg = words.next();

        let movie_id = |arg: Option<&str>| -> Result<MovieId, String> {
            arg.ok_or_else(|| format!("Usage: {command} ID"))?
                .parse()
                .map_err(|err| format!("Movie id must be a number: {err}"))
        };

        match command.as_str() {
            "sort" => arg
                .map(|key| BrowseCommand::Sort(SortKey::from(key)))
                .ok_or_else(|| "Usage: sort KEY".to_string()),
            "like" => movie_id(arg).map(|id| BrowseCommand::Vote(id, VoteAction::Like)),
            "hate" => movie_id(arg).map(|id| BrowseCommand::Vote(id, VoteAction::Hate)),
            "unlike" => movie_id(arg).map(|id| BrowseCommand::Unvote(id, VoteAction::Like)),
            "unhate" => movie_id(arg).map(|id| BrowseCommand::Unvote(id, VoteAction::Hate)),
            "user" => parse_user_id_param(arg.unwrap_or_default())
                .map(BrowseCommand::User),
            "go" => arg
                .ok_or_else(|| "Usage: go PATH".to_string())?
                .parse()
                .map(BrowseCommand::Go),
            "all" => Ok(BrowseCommand::All),
            "refresh" | "r" => Ok(BrowseCommand::Refresh),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "exit" | "q" => Ok(BrowseCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command: {other} (try `help`)")),
        }
    }
}

pub async fn run(app: &App, user: Option<UserId>) -> Result<()> {
    let feed = user.map_or(Feed::All, Feed::User);
    let mut listing = ListingController::new(feed).with_sort(app.default_sort());

    match app.session.username() {
        Some(username) => println!("Signed in as {username}. Type `help` for commands."),
        None => println!("Browsing anonymously; voting needs `movierama login`. Type `help` for commands."),
    }

    listing.activate(&app.movies).await;
    redraw(&mut listing);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("flush stdout")?;

        let Some(line) = lines.next_line().await.context("read command")? else {
            break;
        };

        let command = match line.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{message}");
                }
                continue;
            }
        };
        tracing::debug!(?command, "browse command");

        match command {
            BrowseCommand::Sort(sort) => listing.resort(&app.movies, sort).await,
            BrowseCommand::Vote(id, action) => {
                let outcome = listing.make_action(&app.movies, id, action).await;
                report_vote(&mut listing, id, outcome);
            }
            BrowseCommand::Unvote(id, action) => {
                let outcome = listing.remove_action(&app.movies, id, action).await;
                report_vote(&mut listing, id, outcome);
            }
            BrowseCommand::Go(route) => {
                let Some(next) = ListingController::for_route(route) else {
                    println!("{route} is not a listing; use the matching movierama command.");
                    continue;
                };
                listing = next.with_sort(listing.sort().clone());
                listing.activate(&app.movies).await;
            }
            BrowseCommand::User(user_id) => {
                listing.switch_feed(Feed::User(user_id));
                listing.activate(&app.movies).await;
            }
            BrowseCommand::All => {
                listing.switch_feed(Feed::All);
                listing.activate(&app.movies).await;
            }
            BrowseCommand::Refresh => listing.activate(&app.movies).await,
            BrowseCommand::Help => {
                println!("{HELP}");
                continue;
            }
            BrowseCommand::Quit => break,
        }
        redraw(&mut listing);
    }

    Ok(())
}

/// The listing notice already holds the server message; this adds the
/// login hint when the token was rejected.
fn report_vote(listing: &mut ListingController, movie_id: MovieId, outcome: Result<(), ApiError>) {
    if let Err(err) = outcome {
        tracing::debug!(movie_id, error = %err, "vote failed");
        if err.is_unauthorized() {
            listing.take_notice();
            println!("! {}", describe(&err));
        }
    }
}

fn redraw(listing: &mut ListingController) {
    let title = match listing.feed() {
        Feed::All => "All movies".to_string(),
        Feed::User(user_id) => format!("Movies by user {user_id}"),
    };
    println!("{title} (sorted by {})", listing.sort());
    println!("{}", render::listing(listing));
    if let Some(notice) = listing.take_notice() {
        println!("! {notice}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "sort likes".parse::<BrowseCommand>(),
            Ok(BrowseCommand::Sort(SortKey::Likes))
        );
        assert_eq!(
            "unhate 4".parse::<BrowseCommand>(),
            Ok(BrowseCommand::Unvote(4, VoteAction::Hate))
        );
        assert_eq!(
            " USER 9 ".parse::<BrowseCommand>(),
            Ok(BrowseCommand::User(9))
        );
        assert_eq!("q".parse::<BrowseCommand>(), Ok(BrowseCommand::Quit));
        assert_eq!(
            "go /users/5/movies".parse::<BrowseCommand>(),
            Ok(BrowseCommand::Go(Route::UserMovies(5)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("like".parse::<BrowseCommand>().is_err());
        assert!("like abc".parse::<BrowseCommand>().is_err());
        assert!("user bob".parse::<BrowseCommand>().is_err());
        assert!("go /nowhere".parse::<BrowseCommand>().is_err());
        assert_eq!("".parse::<BrowseCommand>(), Err(String::new()));
        assert!(
            "dance"
                .parse::<BrowseCommand>()
                .unwrap_err()
                .contains("Unknown command")
        );
    }
}
